use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use sqlx::SqlitePool;

use crate::db::shop_repo::{self, NewShopItem};
use crate::error::AppError;
use crate::http::auth::{authorize_player, AdminAuth, Session};

#[derive(Deserialize)]
pub struct PurchaseReq {
    pub player_id: i64,
    pub item_name: String,
}

/// GET /api/shop
#[get("/shop")]
pub async fn list_items(
    session: Option<Session>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    // admins also see disabled items so they can re-enable them
    let include_inactive = session.is_some_and(|s| s.is_admin);
    let items = shop_repo::list_items(&db, include_inactive).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "items": items })))
}

/// POST /api/shop/purchase
#[post("/shop/purchase")]
pub async fn purchase(
    session: Session,
    info: web::Json<PurchaseReq>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    authorize_player(&session, &db, info.player_id).await?;
    let outcome = shop_repo::purchase(&db, info.player_id, info.item_name.trim()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": outcome.message,
        "purchase": outcome,
    })))
}

/// POST /api/shop/items   (admin)
#[post("/shop/items")]
pub async fn create_item(
    _admin: AdminAuth,
    info: web::Json<NewShopItem>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let item = shop_repo::create_item(&db, &info).await?;
    Ok(HttpResponse::Created().json(json!({ "success": true, "item": item })))
}

/// POST /api/shop/items/{id}/toggle   (admin)
#[post("/shop/items/{id}/toggle")]
pub async fn toggle_item(
    _admin: AdminAuth,
    path: web::Path<i64>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let item = shop_repo::toggle_item(&db, path.into_inner()).await?;
    log::info!("shop item {} is_active={}", item.name, item.is_active);
    Ok(HttpResponse::Ok().json(json!({ "success": true, "item": item })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_items)
        .service(purchase)
        .service(create_item)
        .service(toggle_item);
}
