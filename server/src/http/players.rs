//! Player profiles and the admin stat editor.

use actix_web::{delete, get, post, put, web, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use serde_with::skip_serializing_none;
use sqlx::SqlitePool;

use crate::db::evaluation::{self, Evaluation};
use crate::db::models::{GradientTheme, Player, PlayerBooster, PlayerTitle, SiteTheme};
use crate::db::player_repo::{self, EconomyGrant, StatOp, StatsEdit};
use crate::db::shop_repo;
use crate::error::AppError;
use crate::game::experience::star_rating;
use crate::game::leveling::{free_custom_role_progress, LevelPerks};
use crate::game::types::{karma_level, Gamemode, RoleFeatures};
use crate::game::unlock::StatKey;
use crate::http::auth::AdminAuth;

#[derive(Deserialize)]
pub struct NewPlayerReq {
    pub nickname: String,
    pub role: Option<String>,
}

#[derive(Deserialize)]
pub struct ModifyStatReq {
    pub stat: StatKey,
    pub op: StatOp,
    pub value: i64,
}

/// Everything the profile page renders for one player.
#[skip_serializing_none]
#[derive(Serialize)]
pub struct PlayerProfile {
    #[serde(flatten)]
    pub player: Player,
    pub kd_ratio: f64,
    pub fkd_ratio: f64,
    pub win_rate: f64,
    pub total_resources: i64,
    pub level: u32,
    pub level_progress: f64,
    pub perks: LevelPerks,
    pub free_custom_role_progress: f64,
    pub star_rating: u8,
    pub karma_level: &'static str,
    pub role_features: Option<RoleFeatures>,
    pub titles: Vec<PlayerTitle>,
    pub active_boosters: Vec<PlayerBooster>,
    pub nickname_gradient: Option<GradientTheme>,
    pub theme: Option<SiteTheme>,
}

/// Purchased cosmetics shown alongside the profile.
pub struct Cosmetics {
    pub titles: Vec<PlayerTitle>,
    pub boosters: Vec<PlayerBooster>,
    pub gradient: Option<GradientTheme>,
    pub theme: Option<SiteTheme>,
}

impl PlayerProfile {
    pub fn new(player: Player, cosmetics: Cosmetics) -> Self {
        let level = player.level();
        PlayerProfile {
            kd_ratio: player.kd_ratio(),
            fkd_ratio: player.fkd_ratio(),
            win_rate: player.win_rate(),
            total_resources: player.total_resources(),
            level,
            level_progress: player.level_progress(),
            perks: LevelPerks::for_level(level),
            free_custom_role_progress: free_custom_role_progress(level),
            star_rating: star_rating(&player),
            karma_level: karma_level(player.karma),
            role_features: shop_repo::role_features(&player),
            titles: cosmetics.titles,
            active_boosters: cosmetics.boosters,
            nickname_gradient: cosmetics.gradient,
            theme: cosmetics.theme,
            player,
        }
    }
}

async fn updated(db: &SqlitePool, player: Player) -> Result<HttpResponse, AppError> {
    // stat changes may complete quests or unlock achievements
    let eval: Evaluation = evaluation::evaluate(db, player.id).await?;
    let player = if eval.is_empty() {
        player
    } else {
        player_repo::fetch(db, player.id).await?
    };
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "player": player,
        "evaluation": eval,
    })))
}

//////////////////////////////////////////////////
// POST /api/players   (admin)
//////////////////////////////////////////////////
#[post("/players")]
pub async fn create_player(
    _admin: AdminAuth,
    info: web::Json<NewPlayerReq>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let player = player_repo::create(&db, &info.nickname, info.role.as_deref()).await?;
    log::info!("created player {} (#{})", player.nickname, player.id);
    Ok(HttpResponse::Created().json(json!({ "success": true, "player": player })))
}

//////////////////////////////////////////////////
// GET /api/player/{id}
//////////////////////////////////////////////////
#[get("/player/{id}")]
pub async fn get_player(
    path: web::Path<i64>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    let player = player_repo::fetch(&db, id).await?;
    let cosmetics = Cosmetics {
        titles: shop_repo::titles(&db, id).await?,
        boosters: shop_repo::active_boosters(&db, id).await?,
        gradient: shop_repo::nickname_gradient(&db, id).await?,
        theme: shop_repo::selected_theme(&db, &player).await?,
    };
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "player": PlayerProfile::new(player, cosmetics),
    })))
}

//////////////////////////////////////////////////
// PUT /api/player/{id}/stats   (admin)
//////////////////////////////////////////////////
#[put("/player/{id}/stats")]
pub async fn update_stats(
    _admin: AdminAuth,
    path: web::Path<i64>,
    edit: web::Json<StatsEdit>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let player = player_repo::update_stats(&db, path.into_inner(), &edit).await?;
    updated(&db, player).await
}

//////////////////////////////////////////////////
// POST /api/player/{id}/modify-stat   (admin)
//////////////////////////////////////////////////
#[post("/player/{id}/modify-stat")]
pub async fn modify_stat(
    _admin: AdminAuth,
    path: web::Path<i64>,
    info: web::Json<ModifyStatReq>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let player =
        player_repo::modify_stat(&db, path.into_inner(), info.stat, info.op, info.value).await?;
    updated(&db, player).await
}

//////////////////////////////////////////////////
// DELETE /api/player/{id}   (admin)
//////////////////////////////////////////////////
#[delete("/player/{id}")]
pub async fn delete_player(
    _admin: AdminAuth,
    path: web::Path<i64>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let id = path.into_inner();
    player_repo::delete(&db, id).await?;
    log::info!("deleted player #{id}");
    Ok(HttpResponse::Ok().json(json!({ "success": true })))
}

//////////////////////////////////////////////////
// POST /api/player/{id}/economy   (admin)
//////////////////////////////////////////////////
#[post("/player/{id}/economy")]
pub async fn grant_economy(
    _admin: AdminAuth,
    path: web::Path<i64>,
    grant: web::Json<EconomyGrant>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let player = player_repo::grant_economy(&db, path.into_inner(), grant.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "coins": player.coins,
        "reputation": player.reputation,
        "karma": player.karma,
        "karma_level": karma_level(player.karma),
    })))
}

//////////////////////////////////////////////////
// GET /api/player/{id}/gamemode-stats/{mode}
//////////////////////////////////////////////////
#[get("/player/{id}/gamemode-stats/{mode}")]
pub async fn gamemode_stats(
    path: web::Path<(i64, Gamemode)>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let (id, mode) = path.into_inner();
    let player = player_repo::fetch(&db, id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "stats": player.gamemode_stats(mode),
    })))
}

//////////////////////////////////////////////////
// POST /api/player/{id}/evaluate
//////////////////////////////////////////////////
#[post("/player/{id}/evaluate")]
pub async fn evaluate(
    path: web::Path<i64>,
    db: web::Data<SqlitePool>,
) -> Result<HttpResponse, AppError> {
    let eval = evaluation::evaluate(&db, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(json!({ "success": true, "evaluation": eval })))
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(create_player)
        .service(get_player)
        .service(update_stats)
        .service(modify_stat)
        .service(delete_player)
        .service(grant_economy)
        .service(gamemode_stats)
        .service(evaluate);
}
