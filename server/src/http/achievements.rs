use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::db::achievement_repo::{self, NewAchievement};
use crate::db::player_repo;
use crate::error::AppError;
use crate::http::auth::{AdminAuth, Session};

#[derive(Deserialize)]
pub struct AwardReq {
    pub player_id: i64,
    pub achievement_id: i64,
}

/// Hidden achievements are listed for admins only.
#[get("/achievements")]
pub async fn list_achievements(
    session: Option<Session>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let include_hidden = session.is_some_and(|s| s.is_admin);
    let rows = achievement_repo::list(&db, include_hidden).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "achievements": rows })))
}

#[post("/achievements")]
pub async fn create_achievement(
    _admin: AdminAuth,
    info: web::Json<NewAchievement>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let achievement = achievement_repo::create(&db, &info).await?;
    Ok(HttpResponse::Created().json(json!({ "success": true, "achievement": achievement })))
}

#[post("/achievements/grant")]
pub async fn grant(
    _admin: AdminAuth,
    info: web::Json<AwardReq>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let reward = achievement_repo::grant(&db, info.player_id, info.achievement_id).await?;
    log::info!(
        "granted achievement #{} to player #{}",
        info.achievement_id,
        info.player_id
    );
    Ok(HttpResponse::Ok().json(json!({ "success": true, "reward": reward })))
}

#[post("/achievements/revoke")]
pub async fn revoke(
    _admin: AdminAuth,
    info: web::Json<AwardReq>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    achievement_repo::revoke(&db, info.player_id, info.achievement_id).await?;
    log::info!(
        "revoked achievement #{} from player #{}",
        info.achievement_id,
        info.player_id
    );
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

#[get("/player/{id}/achievements")]
pub async fn player_achievements(
    path: web::Path<i64>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    player_repo::fetch(&db, id).await?;
    let rows = achievement_repo::for_player(&db, id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "achievements": rows })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_achievements)
        .service(create_achievement)
        .service(grant)
        .service(revoke)
        .service(player_achievements);
}
