use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashSet;

use crate::cache;
use crate::db::models::{Achievement, Player};
use crate::db::player_repo;
use crate::db::shop_repo::{self, Multipliers};
use crate::error::{AppError, AppResult};
use crate::game::effects::boosted;
use crate::game::types::Rarity;
use crate::game::unlock::UnlockCondition;
use crate::metrics;

#[derive(Debug, Clone, Deserialize)]
pub struct NewAchievement {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub rarity: Rarity,
    pub unlock_condition: UnlockCondition,
    #[serde(default)]
    pub reward_xp: i64,
    #[serde(default)]
    pub reward_coins: i64,
    #[serde(default)]
    pub reward_reputation: i64,
    #[serde(default)]
    pub is_hidden: bool,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct EarnedAchievement {
    pub achievement_id: i64,
    pub name: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub rarity: Rarity,
    pub earned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AchievementReward {
    pub achievement_id: i64,
    pub title: String,
    pub xp: i64,
    pub coins: i64,
    pub reputation: i64,
}

impl AchievementReward {
    fn from_achievement(a: &Achievement, boost: Multipliers) -> Self {
        AchievementReward {
            achievement_id: a.id,
            title: a.title.clone(),
            xp: boosted(a.reward_xp, boost.experience),
            coins: boosted(a.reward_coins, boost.coins),
            reputation: boosted(a.reward_reputation, boost.reputation),
        }
    }
}

pub async fn list(db: &SqlitePool, include_hidden: bool) -> AppResult<Vec<Achievement>> {
    let sql = if include_hidden {
        "SELECT * FROM achievements ORDER BY id"
    } else {
        "SELECT * FROM achievements WHERE is_hidden = 0 ORDER BY id"
    };
    Ok(sqlx::query_as::<_, Achievement>(sql).fetch_all(db).await?)
}

pub async fn fetch(db: &SqlitePool, id: i64) -> AppResult<Achievement> {
    sqlx::query_as::<_, Achievement>("SELECT * FROM achievements WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("achievement"))
}

pub async fn create(db: &SqlitePool, new: &NewAchievement) -> AppResult<Achievement> {
    if new.name.trim().is_empty() || new.title.trim().is_empty() {
        return Err(AppError::validation("name and title are required"));
    }
    if new.reward_xp < 0 || new.reward_coins < 0 || new.reward_reputation < 0 {
        return Err(AppError::validation("rewards must not be negative"));
    }
    new.unlock_condition.validate().map_err(AppError::Validation)?;

    let res = sqlx::query(
        r#"INSERT INTO achievements (name, title, description, icon, rarity, unlock_condition,
                                     reward_xp, reward_coins, reward_reputation, is_hidden,
                                     created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(new.name.trim())
    .bind(new.title.trim())
    .bind(&new.description)
    .bind(&new.icon)
    .bind(new.rarity)
    .bind(Json(&new.unlock_condition))
    .bind(new.reward_xp)
    .bind(new.reward_coins)
    .bind(new.reward_reputation)
    .bind(new.is_hidden)
    .bind(Utc::now())
    .execute(db)
    .await
    .map_err(AppError::from);

    match res {
        Ok(r) => fetch(db, r.last_insert_rowid()).await,
        Err(e) if e.is_unique_violation() => Err(AppError::validation(format!(
            "achievement {} already exists",
            new.name.trim()
        ))),
        Err(e) => Err(e),
    }
}

pub async fn for_player(db: &SqlitePool, player_id: i64) -> AppResult<Vec<EarnedAchievement>> {
    Ok(sqlx::query_as::<_, EarnedAchievement>(
        r#"SELECT a.id AS achievement_id, a.name, a.title, a.description, a.icon, a.rarity,
                  pa.earned_at
             FROM player_achievements pa
             JOIN achievements a ON a.id = pa.achievement_id
            WHERE pa.player_id = ?
            ORDER BY pa.earned_at DESC"#,
    )
    .bind(player_id)
    .fetch_all(db)
    .await?)
}

/// Insert the earned row; `false` when the player already had it.
async fn record(
    conn: &mut SqliteConnection,
    player_id: i64,
    achievement_id: i64,
) -> AppResult<bool> {
    let inserted = sqlx::query(
        r#"INSERT INTO player_achievements (player_id, achievement_id, earned_at)
           VALUES (?, ?, ?)
           ON CONFLICT (player_id, achievement_id) DO NOTHING"#,
    )
    .bind(player_id)
    .bind(achievement_id)
    .bind(Utc::now())
    .execute(conn)
    .await?
    .rows_affected();
    Ok(inserted == 1)
}

/// Award every not-yet-earned achievement whose condition `player` meets.
///
/// Earned ids are read once and the catalogue is evaluated in memory; the
/// summed rewards are credited with a single update.
pub async fn sweep(
    conn: &mut SqliteConnection,
    player: &Player,
    boost: Multipliers,
) -> AppResult<Vec<AchievementReward>> {
    let earned: HashSet<i64> = sqlx::query_scalar(
        "SELECT achievement_id FROM player_achievements WHERE player_id = ?",
    )
    .bind(player.id)
    .fetch_all(&mut *conn)
    .await?
    .into_iter()
    .collect();

    let catalog = sqlx::query_as::<_, Achievement>("SELECT * FROM achievements")
        .fetch_all(&mut *conn)
        .await?;

    let mut rewards = Vec::new();
    for a in catalog
        .iter()
        .filter(|a| !earned.contains(&a.id) && a.unlock_condition.0.is_met(player))
    {
        if record(&mut *conn, player.id, a.id).await? {
            rewards.push(AchievementReward::from_achievement(a, boost));
        }
    }

    if !rewards.is_empty() {
        let (xp, coins, rep) = rewards.iter().fold((0, 0, 0), |(x, c, r), w| {
            (x + w.xp, c + w.coins, r + w.reputation)
        });
        player_repo::credit(conn, player.id, xp, coins, rep, 0).await?;
        metrics::ACHIEVEMENTS_EARNED
            .with_label_values(&["sweep"])
            .inc_by(rewards.len() as u64);
        log::info!("player #{} earned {} achievement(s)", player.id, rewards.len());
    }
    Ok(rewards)
}

/// Admin grant, bypassing the unlock condition.
pub async fn grant(
    db: &SqlitePool,
    player_id: i64,
    achievement_id: i64,
) -> AppResult<AchievementReward> {
    let achievement = fetch(db, achievement_id).await?;
    let mut tx = db.begin().await?;
    player_repo::fetch_conn(&mut tx, player_id).await?;

    if !record(&mut tx, player_id, achievement_id).await? {
        return Err(AppError::validation("player already has this achievement"));
    }
    let boost = shop_repo::multipliers(&mut tx, player_id).await?;
    let reward = AchievementReward::from_achievement(&achievement, boost);
    player_repo::credit(&mut tx, player_id, reward.xp, reward.coins, reward.reputation, 0).await?;
    tx.commit().await?;

    cache::invalidate_stats();
    metrics::ACHIEVEMENTS_EARNED.with_label_values(&["grant"]).inc();
    Ok(reward)
}

/// Remove an earned achievement. Rewards already paid out are kept.
pub async fn revoke(db: &SqlitePool, player_id: i64, achievement_id: i64) -> AppResult<()> {
    let res = sqlx::query(
        "DELETE FROM player_achievements WHERE player_id = ? AND achievement_id = ?",
    )
    .bind(player_id)
    .bind(achievement_id)
    .execute(db)
    .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("player achievement"));
    }
    Ok(())
}
