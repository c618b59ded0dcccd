use actix_web::{delete, get, post, put, web, HttpResponse};
use serde_json::json;
use sqlx::SqlitePool;

use crate::db::candidate_repo::{self, CandidateUpdate, NewCandidate};
use crate::error::AppError;
use crate::http::auth::{AdminAuth, Session};

#[get("/candidates")]
pub async fn list_candidates(
    _session: Session,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let rows = candidate_repo::list(&db).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "candidates": rows })))
}

#[post("/candidates")]
pub async fn create_candidate(
    session: Session,
    info: web::Json<NewCandidate>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let candidate = candidate_repo::create(&db, &info, &session.actor()).await?;
    log::info!("candidate {} added by {}", candidate.nickname, candidate.added_by);
    Ok(HttpResponse::Created().json(json!({ "success": true, "candidate": candidate })))
}

#[put("/candidates/{id}")]
pub async fn update_candidate(
    _session: Session,
    path: web::Path<i64>,
    info: web::Json<CandidateUpdate>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let candidate = candidate_repo::update(&db, path.into_inner(), &info).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "candidate": candidate })))
}

#[delete("/candidates/{id}")]
pub async fn delete_candidate(
    _admin: AdminAuth,
    path: web::Path<i64>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    candidate_repo::delete(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_candidates)
        .service(create_candidate)
        .service(update_candidate)
        .service(delete_candidate);
}
