//! Inventory and booster endpoints.

use actix_web::{get, post, web, HttpResponse};
use serde_json::json;
use sqlx::SqlitePool;

use crate::db::{player_repo, shop_repo};
use crate::error::AppError;
use crate::http::auth::{authorize_player, Session};

/// GET /api/player/{id}/inventory
#[get("/player/{id}/inventory")]
pub async fn get_inventory(
    path: web::Path<i64>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    player_repo::fetch(&db, id).await?;
    let items = shop_repo::inventory(&db, id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "inventory": items })))
}

/// POST /api/player/{id}/inventory/{entry}/use
#[post("/player/{id}/inventory/{entry}/use")]
pub async fn use_item(
    session: Session,
    path: web::Path<(i64, i64)>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let (player_id, entry_id) = path.into_inner();
    authorize_player(&session, &db, player_id).await?;
    let outcome = shop_repo::use_item(&db, player_id, entry_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": outcome.message,
        "remaining": outcome.remaining,
    })))
}

/// GET /api/player/{id}/boosters
#[get("/player/{id}/boosters")]
pub async fn get_boosters(
    path: web::Path<i64>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    player_repo::fetch(&db, id).await?;
    let boosters = shop_repo::active_boosters(&db, id).await?;
    let mut conn = db.acquire().await?;
    let multipliers = shop_repo::multipliers(&mut conn, id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "boosters": boosters,
        "multipliers": multipliers,
    })))
}

/// GET /api/player/{id}/purchases
#[get("/player/{id}/purchases")]
pub async fn get_purchases(
    path: web::Path<i64>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    player_repo::fetch(&db, id).await?;
    let rows = shop_repo::purchases(&db, id).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "purchases": rows })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(get_inventory)
        .service(use_item)
        .service(get_boosters)
        .service(get_purchases);
}
