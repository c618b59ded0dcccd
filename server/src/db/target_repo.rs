use chrono::Utc;
use serde::Deserialize;
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::models::{Target, TargetReaction};
use crate::error::{AppError, AppResult};
use crate::game::types::{ReactionKind, TargetPriority, TargetStatus};

/// Total reactions at which a target starts "bleeding".
pub const BLEEDING_THRESHOLD: i64 = 10;

#[derive(Debug, Clone, Deserialize)]
pub struct NewTarget {
    pub nickname: String,
    #[serde(default)]
    pub server: String,
    #[serde(default)]
    pub gamemode: String,
    #[serde(default)]
    pub reason: String,
    #[serde(default)]
    pub priority: TargetPriority,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TargetUpdate {
    pub server: Option<String>,
    pub gamemode: Option<String>,
    pub reason: Option<String>,
    pub priority: Option<TargetPriority>,
    pub status: Option<TargetStatus>,
}

async fn fetch_conn(conn: &mut SqliteConnection, id: i64) -> AppResult<Target> {
    sqlx::query_as::<_, Target>("SELECT * FROM targets WHERE id = ?")
        .bind(id)
        .fetch_optional(conn)
        .await?
        .ok_or(AppError::NotFound("target"))
}

pub async fn fetch(db: &SqlitePool, id: i64) -> AppResult<Target> {
    let mut conn = db.acquire().await?;
    fetch_conn(&mut conn, id).await
}

/// Targets ordered critical-first, newest first within a priority.
pub async fn list(db: &SqlitePool, status: Option<TargetStatus>) -> AppResult<Vec<Target>> {
    let rows = match status {
        Some(s) => {
            sqlx::query_as::<_, Target>(
                "SELECT * FROM targets WHERE status = ? ORDER BY priority_rank DESC, created_at DESC",
            )
            .bind(s)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, Target>(
                "SELECT * FROM targets ORDER BY priority_rank DESC, created_at DESC",
            )
            .fetch_all(db)
            .await?
        }
    };
    Ok(rows)
}

pub async fn create(db: &SqlitePool, new: &NewTarget, added_by: &str) -> AppResult<Target> {
    let nickname = new.nickname.trim();
    if nickname.is_empty() {
        return Err(AppError::validation("nickname is required"));
    }
    let id = sqlx::query(
        r#"INSERT INTO targets (nickname, server, gamemode, reason, priority, priority_rank,
                                status, added_by, created_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(nickname)
    .bind(new.server.trim())
    .bind(new.gamemode.trim())
    .bind(&new.reason)
    .bind(new.priority)
    .bind(new.priority.rank())
    .bind(TargetStatus::Active)
    .bind(added_by)
    .bind(Utc::now())
    .execute(db)
    .await?
    .last_insert_rowid();
    log::info!("target {nickname} added by {added_by}");
    fetch(db, id).await
}

pub async fn update(db: &SqlitePool, id: i64, upd: &TargetUpdate) -> AppResult<Target> {
    let mut tx = db.begin().await?;
    let mut t = fetch_conn(&mut tx, id).await?;
    if let Some(v) = &upd.server {
        t.server = v.trim().to_string();
    }
    if let Some(v) = &upd.gamemode {
        t.gamemode = v.trim().to_string();
    }
    if let Some(v) = &upd.reason {
        t.reason = v.clone();
    }
    if let Some(p) = upd.priority {
        t.priority = p;
    }
    if let Some(s) = upd.status {
        if s == TargetStatus::Completed && t.completed_at.is_none() {
            t.completed_at = Some(Utc::now());
        }
        t.status = s;
    }

    sqlx::query(
        r#"UPDATE targets
              SET server = ?, gamemode = ?, reason = ?, priority = ?, priority_rank = ?,
                  status = ?, completed_at = ?
            WHERE id = ?"#,
    )
    .bind(&t.server)
    .bind(&t.gamemode)
    .bind(&t.reason)
    .bind(t.priority)
    .bind(t.priority.rank())
    .bind(t.status)
    .bind(t.completed_at)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;
    Ok(t)
}

pub async fn complete(db: &SqlitePool, id: i64) -> AppResult<Target> {
    update(
        db,
        id,
        &TargetUpdate {
            status: Some(TargetStatus::Completed),
            ..TargetUpdate::default()
        },
    )
    .await
}

pub async fn delete(db: &SqlitePool, id: i64) -> AppResult<()> {
    let res = sqlx::query("DELETE FROM targets WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("target"));
    }
    Ok(())
}

/// Record a reaction and bump its counter; sets the bleeding flag once the
/// total reaches [`BLEEDING_THRESHOLD`].
pub async fn react(
    db: &SqlitePool,
    id: i64,
    reaction: ReactionKind,
    reacted_by: &str,
) -> AppResult<Target> {
    let mut tx = db.begin().await?;
    fetch_conn(&mut tx, id).await?;

    // column name comes from the closed ReactionKind set
    let sql = format!(
        "UPDATE targets SET {col} = {col} + 1 WHERE id = ?",
        col = reaction.column()
    );
    sqlx::query(&sql).bind(id).execute(&mut *tx).await?;
    sqlx::query(
        "INSERT INTO target_reactions (target_id, reaction, reacted_by, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(id)
    .bind(reaction)
    .bind(reacted_by)
    .bind(Utc::now())
    .execute(&mut *tx)
    .await?;

    let mut t = fetch_conn(&mut tx, id).await?;
    if !t.bleeding_effect && t.total_reactions() >= BLEEDING_THRESHOLD {
        sqlx::query("UPDATE targets SET bleeding_effect = 1 WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        t.bleeding_effect = true;
        log::info!("target {} is bleeding", t.nickname);
    }
    tx.commit().await?;
    Ok(t)
}

pub async fn reactions(db: &SqlitePool, id: i64) -> AppResult<Vec<TargetReaction>> {
    fetch(db, id).await?;
    Ok(sqlx::query_as::<_, TargetReaction>(
        "SELECT * FROM target_reactions WHERE target_id = ? ORDER BY created_at DESC, id DESC",
    )
    .bind(id)
    .fetch_all(db)
    .await?)
}
