//! Clan target list used by the Discord bot.
//!
//! Reading is public; changes need a session (player or admin), deletion
//! needs an admin.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::db::target_repo::{self, NewTarget, TargetUpdate};
use crate::error::AppError;
use crate::game::types::{ReactionKind, TargetStatus};
use crate::http::auth::{AdminAuth, Session};

#[derive(Deserialize)]
pub struct ListParams {
    pub status: Option<TargetStatus>,
}

#[derive(Deserialize)]
pub struct ReactReq {
    pub reaction: ReactionKind,
}

#[get("/targets")]
pub async fn list_targets(
    web::Query(params): web::Query<ListParams>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let rows = target_repo::list(&db, params.status).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "targets": rows })))
}

#[post("/targets")]
pub async fn create_target(
    session: Session,
    info: web::Json<NewTarget>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let target = target_repo::create(&db, &info, &session.actor()).await?;
    Ok(HttpResponse::Created().json(json!({ "success": true, "target": target })))
}

#[put("/targets/{id}")]
pub async fn update_target(
    _session: Session,
    path: web::Path<i64>,
    info: web::Json<TargetUpdate>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let target = target_repo::update(&db, path.into_inner(), &info).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "target": target })))
}

#[post("/targets/{id}/complete")]
pub async fn complete_target(
    session: Session,
    path: web::Path<i64>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let target = target_repo::complete(&db, path.into_inner()).await?;
    log::info!("target {} completed by {}", target.nickname, session.actor());
    Ok(HttpResponse::Ok().json(json!({ "success": true, "target": target })))
}

#[post("/targets/{id}/react")]
pub async fn react(
    session: Session,
    path: web::Path<i64>,
    info: web::Json<ReactReq>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let target = target_repo::react(&db, path.into_inner(), info.reaction, &session.actor()).await?;
    let total = target.total_reactions();
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "target": target,
        "total_reactions": total,
    })))
}

#[get("/targets/{id}/reactions")]
pub async fn list_reactions(
    path: web::Path<i64>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let rows = target_repo::reactions(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "reactions": rows })))
}

#[delete("/targets/{id}")]
pub async fn delete_target(
    _admin: AdminAuth,
    path: web::Path<i64>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    target_repo::delete(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_targets)
        .service(create_target)
        .service(update_target)
        .service(complete_target)
        .service(react)
        .service(list_reactions)
        .service(delete_target);
}
