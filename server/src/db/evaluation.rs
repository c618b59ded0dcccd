//! Quest progress + achievement sweep for one player, in one transaction.

use serde::Serialize;
use sqlx::SqlitePool;

use crate::cache;
use crate::db::achievement_repo::{self, AchievementReward};
use crate::db::quest_repo::{self, CompletedQuest};
use crate::db::{player_repo, shop_repo};
use crate::error::AppResult;

#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    pub completed_quests: Vec<CompletedQuest>,
    pub new_achievements: Vec<AchievementReward>,
}

impl Evaluation {
    pub fn is_empty(&self) -> bool {
        self.completed_quests.is_empty() && self.new_achievements.is_empty()
    }
}

#[tracing::instrument(skip(db))]
pub async fn evaluate(db: &SqlitePool, player_id: i64) -> AppResult<Evaluation> {
    let mut tx = db.begin().await?;
    let player = player_repo::fetch_conn(&mut tx, player_id).await?;
    let boost = shop_repo::multipliers(&mut tx, player_id).await?;

    let completed_quests = quest_repo::update_progress(&mut tx, &player, boost).await?;

    // quest rewards may have pushed experience (and so level) over a threshold
    let player = if completed_quests.is_empty() {
        player
    } else {
        player_repo::fetch_conn(&mut tx, player_id).await?
    };
    let new_achievements = achievement_repo::sweep(&mut tx, &player, boost).await?;

    tx.commit().await?;
    let eval = Evaluation {
        completed_quests,
        new_achievements,
    };
    if !eval.is_empty() {
        cache::invalidate_stats();
    }
    Ok(eval)
}
