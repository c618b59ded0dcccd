use chrono::Utc;
use serde::Deserialize;
use sqlx::types::Json;
use sqlx::SqlitePool;

use crate::db::models::Candidate;
use crate::error::{AppError, AppResult};
use crate::game::types::CandidateStatus;

#[derive(Debug, Clone, Deserialize)]
pub struct NewCandidate {
    pub nickname: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub servers: Vec<String>,
    #[serde(default)]
    pub contact: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CandidateUpdate {
    pub description: Option<String>,
    pub servers: Option<Vec<String>>,
    pub contact: Option<String>,
    pub status: Option<CandidateStatus>,
    pub notes: Option<String>,
}

fn clean_servers(servers: &[String]) -> Vec<String> {
    servers
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub async fn fetch(db: &SqlitePool, id: i64) -> AppResult<Candidate> {
    sqlx::query_as::<_, Candidate>("SELECT * FROM candidates WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(AppError::NotFound("candidate"))
}

pub async fn list(db: &SqlitePool) -> AppResult<Vec<Candidate>> {
    Ok(
        sqlx::query_as::<_, Candidate>("SELECT * FROM candidates ORDER BY updated_at DESC")
            .fetch_all(db)
            .await?,
    )
}

pub async fn create(db: &SqlitePool, new: &NewCandidate, added_by: &str) -> AppResult<Candidate> {
    let nickname = new.nickname.trim();
    if nickname.is_empty() {
        return Err(AppError::validation("nickname is required"));
    }
    let now = Utc::now();
    let res = sqlx::query(
        r#"INSERT INTO candidates (nickname, description, servers, contact, status, added_by,
                                   notes, created_at, updated_at)
           VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"#,
    )
    .bind(nickname)
    .bind(&new.description)
    .bind(Json(clean_servers(&new.servers)))
    .bind(new.contact.trim())
    .bind(CandidateStatus::Candidate)
    .bind(added_by)
    .bind(&new.notes)
    .bind(now)
    .bind(now)
    .execute(db)
    .await
    .map_err(AppError::from);

    match res {
        Ok(r) => fetch(db, r.last_insert_rowid()).await,
        Err(e) if e.is_unique_violation() => Err(AppError::validation(format!(
            "{nickname} is already a candidate"
        ))),
        Err(e) => Err(e),
    }
}

pub async fn update(db: &SqlitePool, id: i64, upd: &CandidateUpdate) -> AppResult<Candidate> {
    let mut c = fetch(db, id).await?;
    if let Some(v) = &upd.description {
        c.description = v.clone();
    }
    if let Some(v) = &upd.servers {
        c.servers = Json(clean_servers(v));
    }
    if let Some(v) = &upd.contact {
        c.contact = v.trim().to_string();
    }
    if let Some(s) = upd.status {
        c.status = s;
    }
    if let Some(v) = &upd.notes {
        c.notes = v.clone();
    }
    c.updated_at = Utc::now();

    sqlx::query(
        r#"UPDATE candidates
              SET description = ?, servers = ?, contact = ?, status = ?, notes = ?, updated_at = ?
            WHERE id = ?"#,
    )
    .bind(&c.description)
    .bind(Json(&c.servers.0))
    .bind(&c.contact)
    .bind(c.status)
    .bind(&c.notes)
    .bind(c.updated_at)
    .bind(id)
    .execute(db)
    .await?;
    Ok(c)
}

pub async fn delete(db: &SqlitePool, id: i64) -> AppResult<()> {
    let res = sqlx::query("DELETE FROM candidates WHERE id = ?")
        .bind(id)
        .execute(db)
        .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("candidate"));
    }
    Ok(())
}
