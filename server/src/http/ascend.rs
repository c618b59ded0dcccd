use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::db::ascend_repo::{self, AscendInput};
use crate::db::player_repo;
use crate::error::AppError;
use crate::game::types::Gamemode;
use crate::http::auth::AdminAuth;

#[derive(Deserialize)]
pub struct ModeParams {
    #[serde(default)]
    pub gamemode: Gamemode,
}

#[derive(Deserialize)]
pub struct HistoryParams {
    pub gamemode: Option<Gamemode>,
    pub limit: Option<i64>,
}

#[get("/player/{id}/ascend-data")]
pub async fn get_ascend(
    path: web::Path<i64>,
    web::Query(params): web::Query<ModeParams>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    player_repo::fetch(&db, id).await?;
    let data = ascend_repo::fetch(&db, id, params.gamemode).await?;
    // an unrated player still gets the skill names for the form
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "gamemode": params.gamemode,
        "skill_names": params.gamemode.skill_names(),
        "ascend": data,
    })))
}

#[post("/player/{id}/ascend-data")]
pub async fn save_ascend(
    admin: AdminAuth,
    path: web::Path<i64>,
    input: web::Json<AscendInput>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let mut input = input.into_inner();
    if input.evaluator.is_none() {
        input.evaluator = Some(admin.0.actor());
    }
    let data = ascend_repo::upsert(&db, path.into_inner(), &input).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "ascend": data })))
}

#[get("/player/{id}/ascend-history")]
pub async fn ascend_history(
    path: web::Path<i64>,
    web::Query(params): web::Query<HistoryParams>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let limit = params.limit.unwrap_or(20).clamp(1, 100);
    let rows = ascend_repo::history(&db, path.into_inner(), params.gamemode, limit).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "history": rows })))
}

#[get("/gamemodes")]
pub async fn gamemodes() -> HttpResponse {
    let modes: Vec<_> = Gamemode::ALL
        .iter()
        .map(|m| {
            json!({
                "id": m,
                "name": m.display_name(),
                "skills": m.skill_names(),
            })
        })
        .collect();
    HttpResponse::Ok().json(json!({ "success": true, "gamemodes": modes }))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_ascend)
        .service(save_ascend)
        .service(ascend_history)
        .service(gamemodes);
}
