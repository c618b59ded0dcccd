use actix_web::{get, post, web, HttpResponse};
use serde_json::json;
use sqlx::SqlitePool;

use crate::db::player_repo;
use crate::db::quest_repo::{self, NewQuest};
use crate::error::AppError;
use crate::http::auth::{AdminAuth, PlayerAuth};

#[get("/quests")]
pub async fn list_quests(db: web::Data<SqlitePool>) -> Result<HttpResponse, AppError> {
    let quests = quest_repo::list_active(&db).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "quests": quests })))
}

#[post("/quests")]
pub async fn create_quest(
    _admin: AdminAuth,
    info: web::Json<NewQuest>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let quest = quest_repo::create(&db, &info).await?;
    Ok(HttpResponse::Created().json(json!({ "success": true, "quest": quest })))
}

#[get("/quests/{id}/stats")]
pub async fn quest_stats(
    path: web::Path<i64>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let quest = quest_repo::fetch(&db, path.into_inner()).await?;
    let rate = quest_repo::completion_rate(&db, quest.id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "quest": quest,
        "completion_rate": rate,
    })))
}

/// Accept on behalf of the logged-in player; progress counts from now.
#[post("/quests/{id}/accept")]
pub async fn accept_quest(
    auth: PlayerAuth,
    path: web::Path<i64>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let player = player_repo::fetch_by_nickname(&db, &auth.nickname).await?;
    let pq = quest_repo::accept(&db, player.id, path.into_inner()).await?;
    log::info!("{} accepted quest #{}", player.nickname, pq.quest_id);
    Ok(HttpResponse::Ok().json(json!({ "success": true, "player_quest": pq })))
}

#[post("/quests/{id}/reset")]
pub async fn reset_quest(
    _admin: AdminAuth,
    path: web::Path<i64>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let rows = quest_repo::reset(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "reset": rows })))
}

#[get("/player/{id}/quests")]
pub async fn player_quests(
    path: web::Path<i64>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    player_repo::fetch(&db, id).await?;
    let quests = quest_repo::for_player(&db, id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "quests": quests })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_quests)
        .service(create_quest)
        .service(quest_stats)
        .service(accept_quest)
        .service(reset_quest)
        .service(player_quests);
}
