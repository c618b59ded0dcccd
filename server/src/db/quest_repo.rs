use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::models::{Player, PlayerQuest, Quest};
use crate::db::player_repo;
use crate::db::shop_repo::Multipliers;
use crate::error::{AppError, AppResult};
use crate::game::effects::boosted;
use crate::game::quests::{progress, rollover, Rollover};
use crate::game::types::{Difficulty, QuestCategory};
use crate::game::unlock::StatKey;
use crate::metrics;

#[derive(Debug, Clone, Deserialize)]
pub struct NewQuest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub target_stat: StatKey,
    pub target_value: i64,
    #[serde(default)]
    pub category: QuestCategory,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub reward_xp: i64,
    #[serde(default)]
    pub reward_coins: i64,
    #[serde(default)]
    pub reward_reputation: i64,
    #[serde(default)]
    pub reward_karma: i64,
}

impl NewQuest {
    fn validate(&self) -> AppResult<()> {
        if self.title.trim().is_empty() {
            return Err(AppError::validation("quest title must not be empty"));
        }
        if !self.target_stat.is_counter() {
            return Err(AppError::validation(format!(
                "quests can only track counters, not {}",
                self.target_stat
            )));
        }
        if self.target_value <= 0 {
            return Err(AppError::validation("target_value must be positive"));
        }
        if self.reward_xp < 0 || self.reward_coins < 0 || self.reward_reputation < 0 {
            return Err(AppError::validation("rewards must not be negative"));
        }
        Ok(())
    }
}

/// A player's quest row joined with its template.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct PlayerQuestView {
    pub quest_id: i64,
    pub title: String,
    pub description: String,
    pub target_stat: String,
    pub target_value: i64,
    pub category: QuestCategory,
    pub difficulty: Difficulty,
    pub reward_xp: i64,
    pub reward_coins: i64,
    pub reward_reputation: i64,
    pub reward_karma: i64,
    pub current_progress: i64,
    pub is_accepted: bool,
    pub is_completed: bool,
    pub accepted_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

#[derive(sqlx::FromRow)]
struct OpenQuest {
    pq_id: i64,
    baseline_value: i64,
    #[sqlx(flatten)]
    quest: Quest,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompletedQuest {
    pub quest_id: i64,
    pub title: String,
    pub xp: i64,
    pub coins: i64,
    pub reputation: i64,
    pub karma: i64,
}

pub async fn fetch(db: &SqlitePool, id: i64) -> AppResult<Quest> {
    sqlx::query_as::<_, Quest>("SELECT * FROM quests WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("quest"))
}

pub async fn create(db: &SqlitePool, new: &NewQuest) -> AppResult<Quest> {
    new.validate()?;
    let now = Utc::now();
    let id = sqlx::query(
        r#"INSERT INTO quests (title, description, target_stat, target_value, category,
                               difficulty, reward_xp, reward_coins, reward_reputation,
                               reward_karma, last_refresh, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(new.title.trim())
    .bind(&new.description)
    .bind(new.target_stat.as_str())
    .bind(new.target_value)
    .bind(new.category)
    .bind(new.difficulty)
    .bind(new.reward_xp)
    .bind(new.reward_coins)
    .bind(new.reward_reputation)
    .bind(new.reward_karma)
    .bind(now)
    .bind(now)
    .execute(db)
    .await?
    .last_insert_rowid();
    log::info!("created quest #{id} {:?}", new.title);
    fetch(db, id).await
}

/// Active quests, after applying any due category rollover.
pub async fn list_active(db: &SqlitePool) -> AppResult<Vec<Quest>> {
    refresh_due(db, Utc::now()).await?;
    Ok(sqlx::query_as::<_, Quest>(
        "SELECT * FROM quests WHERE is_active = 1 ORDER BY category, difficulty, id",
    )
    .fetch_all(db)
    .await?)
}

async fn reset_progress(
    conn: &mut SqliteConnection,
    quest_id: i64,
    now: DateTime<Utc>,
) -> AppResult<u64> {
    let reset = sqlx::query(
        r#"UPDATE player_quests
              SET is_accepted = 0, is_completed = 0, current_progress = 0,
                  baseline_value = 0, accepted_at = NULL, completed_at = NULL
            WHERE quest_id = ?"#,
    )
    .bind(quest_id)
    .execute(&mut *conn)
    .await?
    .rows_affected();
    stamp(conn, quest_id, now).await?;
    Ok(reset)
}

async fn stamp(conn: &mut SqliteConnection, quest_id: i64, now: DateTime<Utc>) -> AppResult<()> {
    sqlx::query("UPDATE quests SET last_refresh = ? WHERE id = ?")
        .bind(now)
        .bind(quest_id)
        .execute(conn)
        .await?;
    Ok(())
}

/// Roll over every periodic quest whose period ended. Returns how many quests reset.
pub async fn refresh_due(db: &SqlitePool, now: DateTime<Utc>) -> AppResult<usize> {
    let quests = sqlx::query_as::<_, Quest>(
        "SELECT * FROM quests WHERE is_active = 1 AND category IN ('daily', 'weekly', 'monthly')",
    )
    .fetch_all(db)
    .await?;

    let mut tx = db.begin().await?;
    let mut reset = 0;
    for q in &quests {
        match rollover(q.category, q.last_refresh, now) {
            Rollover::None => {}
            Rollover::StampOnly => stamp(&mut tx, q.id, now).await?,
            Rollover::Reset => {
                let rows = reset_progress(&mut tx, q.id, now).await?;
                log::info!(
                    "quest #{} ({:?}) rolled over, {rows} player rows reset",
                    q.id,
                    q.category
                );
                reset += 1;
            }
        }
    }
    tx.commit().await?;
    Ok(reset)
}

/// Admin reset of a single quest regardless of its category.
pub async fn reset(db: &SqlitePool, quest_id: i64) -> AppResult<u64> {
    fetch(db, quest_id).await?;
    let mut tx = db.begin().await?;
    let rows = reset_progress(&mut tx, quest_id, Utc::now()).await?;
    tx.commit().await?;
    Ok(rows)
}

pub async fn accept(db: &SqlitePool, player_id: i64, quest_id: i64) -> AppResult<PlayerQuest> {
    let quest = fetch(db, quest_id).await?;
    if !quest.is_active {
        return Err(AppError::validation("quest is not active"));
    }
    let stat = quest
        .stat()
        .ok_or_else(|| AppError::validation("quest tracks an unknown stat"))?;

    let mut tx = db.begin().await?;
    let player = player_repo::fetch_conn(&mut tx, player_id).await?;

    let already: Option<bool> = sqlx::query_scalar(
        "SELECT is_accepted FROM player_quests WHERE player_id = ? AND quest_id = ?",
    )
    .bind(player_id)
    .bind(quest_id)
    .fetch_optional(&mut *tx)
    .await?;
    if already == Some(true) {
        return Err(AppError::validation("quest already accepted"));
    }

    let now = Utc::now();
    sqlx::query(
        r#"INSERT INTO player_quests (player_id, quest_id, baseline_value, current_progress,
                                      is_accepted, is_completed, accepted_at)
           VALUES (?, ?, ?, 0, 1, 0, ?)
           ON CONFLICT (player_id, quest_id) DO UPDATE
              SET baseline_value = excluded.baseline_value, current_progress = 0,
                  is_accepted = 1, is_completed = 0,
                  accepted_at = excluded.accepted_at, completed_at = NULL"#,
    )
    .bind(player_id)
    .bind(quest_id)
    .bind(stat.read(&player) as i64)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    let pq = sqlx::query_as::<_, PlayerQuest>(
        "SELECT * FROM player_quests WHERE player_id = ? AND quest_id = ?",
    )
    .bind(player_id)
    .bind(quest_id)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(pq)
}

pub async fn for_player(db: &SqlitePool, player_id: i64) -> AppResult<Vec<PlayerQuestView>> {
    Ok(sqlx::query_as::<_, PlayerQuestView>(
        r#"SELECT q.id AS quest_id, q.title, q.description, q.target_stat, q.target_value,
                  q.category, q.difficulty, q.reward_xp, q.reward_coins,
                  q.reward_reputation, q.reward_karma,
                  pq.current_progress, pq.is_accepted, pq.is_completed,
                  pq.accepted_at, pq.completed_at
             FROM player_quests pq
             JOIN quests q ON q.id = pq.quest_id
            WHERE pq.player_id = ? AND pq.is_accepted = 1
            ORDER BY pq.is_completed, q.id"#,
    )
    .bind(player_id)
    .fetch_all(db)
    .await?)
}

/// Share of acceptances that ended in completion, in percent.
pub async fn completion_rate(db: &SqlitePool, quest_id: i64) -> AppResult<f64> {
    let (accepted, completed): (i64, i64) = sqlx::query_as(
        r#"SELECT COUNT(*), COALESCE(SUM(is_completed), 0)
             FROM player_quests WHERE quest_id = ? AND is_accepted = 1"#,
    )
    .bind(quest_id)
    .fetch_one(db)
    .await?;
    Ok(if accepted > 0 {
        crate::game::stats::round_to(completed as f64 / accepted as f64 * 100.0, 1)
    } else {
        0.0
    })
}

/// Recompute progress for every open quest of `player` and pay out completions.
///
/// The completion flip is guarded by `is_completed = 0`, so a quest already
/// paid out is never paid again even if this runs twice.
pub async fn update_progress(
    conn: &mut SqliteConnection,
    player: &Player,
    boost: Multipliers,
) -> AppResult<Vec<CompletedQuest>> {
    let open = sqlx::query_as::<_, OpenQuest>(
        r#"SELECT pq.id AS pq_id, pq.baseline_value, q.*
             FROM player_quests pq
             JOIN quests q ON q.id = pq.quest_id
            WHERE pq.player_id = ? AND pq.is_accepted = 1 AND pq.is_completed = 0"#,
    )
    .bind(player.id)
    .fetch_all(&mut *conn)
    .await?;

    let now = Utc::now();
    let mut done = Vec::new();
    for OpenQuest {
        pq_id,
        baseline_value: baseline,
        quest,
    } in open
    {
        let Some(stat) = quest.stat() else {
            log::warn!("quest #{} tracks unknown stat {:?}", quest.id, quest.target_stat);
            continue;
        };
        let current = progress(stat.read(player) as i64, baseline);

        sqlx::query("UPDATE player_quests SET current_progress = ? WHERE id = ?")
            .bind(current)
            .bind(pq_id)
            .execute(&mut *conn)
            .await?;
        if current < quest.target_value {
            continue;
        }

        let flipped = sqlx::query(
            "UPDATE player_quests SET is_completed = 1, completed_at = ? WHERE id = ? AND is_completed = 0",
        )
        .bind(now)
        .bind(pq_id)
        .execute(&mut *conn)
        .await?
        .rows_affected();
        if flipped == 0 {
            continue;
        }

        let reward = CompletedQuest {
            quest_id: quest.id,
            title: quest.title.clone(),
            xp: boosted(quest.reward_xp, boost.experience),
            coins: boosted(quest.reward_coins, boost.coins),
            reputation: boosted(quest.reward_reputation, boost.reputation),
            karma: quest.reward_karma,
        };
        player_repo::credit(
            conn,
            player.id,
            reward.xp,
            reward.coins,
            reward.reputation,
            reward.karma,
        )
        .await?;
        metrics::QUESTS_COMPLETED
            .with_label_values(&[category_label(quest.category)])
            .inc();
        log::info!("player #{} completed quest #{}", player.id, quest.id);
        done.push(reward);
    }
    Ok(done)
}

fn category_label(c: QuestCategory) -> &'static str {
    match c {
        QuestCategory::Daily => "daily",
        QuestCategory::Weekly => "weekly",
        QuestCategory::Monthly => "monthly",
        QuestCategory::Permanent => "permanent",
        QuestCategory::Thematic => "thematic",
        QuestCategory::Mythic => "mythic",
    }
}
