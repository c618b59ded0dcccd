use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::models::{AscendData, AscendHistory};
use crate::db::player_repo;
use crate::error::{AppError, AppResult};
use crate::game::scoring::{overall_tier, tier_from_score, ChangeType, Tier};
use crate::game::types::Gamemode;

#[derive(Debug, Clone, Deserialize)]
pub struct AscendInput {
    #[serde(default)]
    pub gamemode: Gamemode,
    pub scores: [i64; 4],
    /// Defaults to the gamemode's standard skill names.
    pub skill_names: Option<[String; 4]>,
    #[serde(default)]
    pub comment: String,
    pub evaluator: Option<String>,
}

impl AscendInput {
    fn validate(&self) -> AppResult<()> {
        if let Some(bad) = self.scores.iter().find(|s| !(0..=100).contains(*s)) {
            return Err(AppError::validation(format!(
                "skill scores must be within 0-100, got {bad}"
            )));
        }
        if let Some(names) = &self.skill_names {
            if names.iter().any(|n| n.trim().is_empty()) {
                return Err(AppError::validation("skill names must not be empty"));
            }
        }
        Ok(())
    }

    fn names(&self) -> [String; 4] {
        self.skill_names
            .clone()
            .unwrap_or_else(|| self.gamemode.skill_names().map(str::to_string))
    }
}

async fn fetch_conn(
    conn: &mut SqliteConnection,
    player_id: i64,
    mode: Gamemode,
) -> AppResult<Option<AscendData>> {
    Ok(sqlx::query_as::<_, AscendData>(
        "SELECT * FROM ascend_data WHERE player_id = ? AND gamemode = ?",
    )
    .bind(player_id)
    .bind(mode)
    .fetch_optional(conn)
    .await?)
}

pub async fn fetch(db: &SqlitePool, player_id: i64, mode: Gamemode) -> AppResult<Option<AscendData>> {
    let mut conn = db.acquire().await?;
    fetch_conn(&mut conn, player_id, mode).await
}

/// Recompute `global_rank` for every row of `mode`:
/// 1 + number of other players with a strictly higher average.
async fn rerank(conn: &mut SqliteConnection, mode: Gamemode) -> AppResult<()> {
    sqlx::query(
        r#"UPDATE ascend_data
              SET global_rank = 1 + (
                  SELECT COUNT(*) FROM ascend_data o
                   WHERE o.gamemode = ascend_data.gamemode
                     AND o.player_id != ascend_data.player_id
                     AND (o.skill1_score + o.skill2_score + o.skill3_score + o.skill4_score)
                       > (ascend_data.skill1_score + ascend_data.skill2_score
                          + ascend_data.skill3_score + ascend_data.skill4_score))
            WHERE gamemode = ?"#,
    )
    .bind(mode)
    .execute(conn)
    .await?;
    Ok(())
}

/// Create or overwrite a player's evaluation. Every tier is derived from its
/// score; an overwrite first snapshots the prior state into history.
#[tracing::instrument(skip(db, input), fields(mode = ?input.gamemode))]
pub async fn upsert(db: &SqlitePool, player_id: i64, input: &AscendInput) -> AppResult<AscendData> {
    input.validate()?;
    let mode = input.gamemode;
    let names = input.names();
    let tiers = input.scores.map(tier_from_score);
    let overall = overall_tier(input.scores);
    let now = Utc::now();

    let mut tx = db.begin().await?;
    player_repo::fetch_conn(&mut tx, player_id).await?;
    let existing = fetch_conn(&mut tx, player_id, mode).await?;

    let previous_tier: Option<Tier> = match &existing {
        Some(old) => {
            sqlx::query(
                r#"INSERT INTO ascend_history (player_id, gamemode, old_tier, new_tier,
                                               old_scores, new_scores, change_type,
                                               evaluator, comment, created_at)
                   VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(player_id)
            .bind(mode)
            .bind(old.overall_tier)
            .bind(overall)
            .bind(Json(old.scores()))
            .bind(Json(input.scores))
            .bind(ChangeType::between(old.overall_tier, overall))
            .bind(&input.evaluator)
            .bind(&input.comment)
            .bind(now)
            .execute(&mut *tx)
            .await?;
            Some(old.overall_tier)
        }
        None => None,
    };

    sqlx::query(
        r#"INSERT INTO ascend_data (player_id, gamemode,
                                    skill1_name, skill1_score, skill1_tier,
                                    skill2_name, skill2_score, skill2_tier,
                                    skill3_name, skill3_score, skill3_tier,
                                    skill4_name, skill4_score, skill4_tier,
                                    overall_tier, previous_tier, comment, evaluator, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
           ON CONFLICT (player_id, gamemode) DO UPDATE SET
               skill1_name = excluded.skill1_name, skill1_score = excluded.skill1_score,
               skill1_tier = excluded.skill1_tier,
               skill2_name = excluded.skill2_name, skill2_score = excluded.skill2_score,
               skill2_tier = excluded.skill2_tier,
               skill3_name = excluded.skill3_name, skill3_score = excluded.skill3_score,
               skill3_tier = excluded.skill3_tier,
               skill4_name = excluded.skill4_name, skill4_score = excluded.skill4_score,
               skill4_tier = excluded.skill4_tier,
               overall_tier = excluded.overall_tier, previous_tier = excluded.previous_tier,
               comment = excluded.comment, evaluator = excluded.evaluator,
               updated_at = excluded.updated_at"#,
    )
    .bind(player_id)
    .bind(mode)
    .bind(&names[0])
    .bind(input.scores[0])
    .bind(tiers[0])
    .bind(&names[1])
    .bind(input.scores[1])
    .bind(tiers[1])
    .bind(&names[2])
    .bind(input.scores[2])
    .bind(tiers[2])
    .bind(&names[3])
    .bind(input.scores[3])
    .bind(tiers[3])
    .bind(overall)
    .bind(previous_tier)
    .bind(&input.comment)
    .bind(&input.evaluator)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    rerank(&mut tx, mode).await?;
    let saved = fetch_conn(&mut tx, player_id, mode)
        .await?
        .ok_or(AppError::NotFound("ascend data"))?;
    tx.commit().await?;

    log::info!(
        "ascend {mode:?} for player #{player_id}: {} (was {:?})",
        saved.overall_tier,
        previous_tier
    );
    Ok(saved)
}

pub async fn history(
    db: &SqlitePool,
    player_id: i64,
    mode: Option<Gamemode>,
    limit: i64,
) -> AppResult<Vec<AscendHistory>> {
    let rows = match mode {
        Some(m) => {
            sqlx::query_as::<_, AscendHistory>(
                r#"SELECT * FROM ascend_history WHERE player_id = ? AND gamemode = ?
                    ORDER BY created_at DESC, id DESC LIMIT ?"#,
            )
            .bind(player_id)
            .bind(m)
            .bind(limit)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, AscendHistory>(
                r#"SELECT * FROM ascend_history WHERE player_id = ?
                    ORDER BY created_at DESC, id DESC LIMIT ?"#,
            )
            .bind(player_id)
            .bind(limit)
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}
