// src/http/leaderboard.rs

use actix_web::{get, web, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use serde_with::skip_serializing_none;
use sqlx::SqlitePool;

use crate::cache::{self, STATS, STATS_KEY};
use crate::db::models::Player;
use crate::db::player_repo::{self, GlobalStats, LeaderboardSort};

const MAX_PAGE: i64 = 100;
/// Pages starting at or past this offset are served uncached.
pub const MAX_CACHED_OFFSET: i64 = 500;

#[derive(Deserialize)]
pub struct LeaderboardParams {
    #[serde(default)]
    pub sort: LeaderboardSort,
    /// Maximum number of entries to return (1..=100, default 50).
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: String,
    pub limit: Option<i64>,
}

/// One leaderboard row: raw counters plus the derived values the UI sorts on.
#[skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct LeaderboardEntry {
    pub position: i64,
    pub id: i64,
    pub nickname: String,
    pub role: String,
    pub custom_role: Option<String>,
    pub custom_role_color: Option<String>,
    pub level: u32,
    pub level_progress: f64,
    pub experience: i64,
    pub kills: i64,
    pub final_kills: i64,
    pub deaths: i64,
    pub beds_broken: i64,
    pub wins: i64,
    pub games_played: i64,
    pub kd_ratio: f64,
    pub win_rate: f64,
    pub coins: i64,
    pub reputation: i64,
}

impl LeaderboardEntry {
    fn new(position: i64, p: Player) -> Self {
        LeaderboardEntry {
            position,
            level: p.level(),
            level_progress: p.level_progress(),
            kd_ratio: p.kd_ratio(),
            win_rate: p.win_rate(),
            id: p.id,
            nickname: p.nickname,
            role: p.role,
            custom_role: p.custom_role,
            custom_role_color: p.custom_role_color,
            experience: p.experience,
            kills: p.kills,
            final_kills: p.final_kills,
            deaths: p.deaths,
            beds_broken: p.beds_broken,
            wins: p.wins,
            games_played: p.games_played,
            coins: p.coins,
            reputation: p.reputation,
        }
    }
}

//////////////////////////////////////////////////
// GET /api/leaderboard?sort&limit&offset
//////////////////////////////////////////////////
#[get("/leaderboard")]
pub async fn leaderboard(
    db: web::Data<SqlitePool>,
    web::Query(params): web::Query<LeaderboardParams>,
) -> impl Responder {
    let limit = params.limit.unwrap_or(50).clamp(1, MAX_PAGE);
    let offset = params.offset.unwrap_or(0).max(0);

    // 1) cached page
    let key = cache::leaderboard_key(params.sort.as_str(), limit, offset);
    if let Some(cached) = STATS.get(&key) {
        return HttpResponse::Ok().json(cached);
    }

    // 2) query; a failed read still answers with an empty page
    let rows = match player_repo::leaderboard(&db, params.sort, limit, offset).await {
        Ok(r) => r,
        Err(e) => {
            log::error!("leaderboard query failed: {e}");
            return HttpResponse::Ok().json(json!({
                "success": true,
                "players": [],
                "sort": params.sort,
            }));
        }
    };

    let entries: Vec<LeaderboardEntry> = rows
        .into_iter()
        .enumerate()
        .map(|(i, p)| LeaderboardEntry::new(offset + i as i64 + 1, p))
        .collect();
    let body = json!({
        "success": true,
        "players": entries,
        "sort": params.sort,
        "limit": limit,
        "offset": offset,
    });

    // 3) remember shallow pages until the next stats change
    if offset < MAX_CACHED_OFFSET {
        STATS.set(key, body.clone());
    }
    HttpResponse::Ok().json(body)
}

//////////////////////////////////////////////////
// GET /api/players/search?q
//////////////////////////////////////////////////
#[get("/players/search")]
pub async fn search(
    db: web::Data<SqlitePool>,
    web::Query(params): web::Query<SearchParams>,
) -> impl Responder {
    let q = params.q.trim();
    if q.is_empty() {
        return HttpResponse::Ok().json(json!({ "success": true, "players": [] }));
    }
    let limit = params.limit.unwrap_or(20).clamp(1, MAX_PAGE);
    match player_repo::search(&db, q, limit).await {
        Ok(rows) => {
            let entries: Vec<LeaderboardEntry> = rows
                .into_iter()
                .enumerate()
                .map(|(i, p)| LeaderboardEntry::new(i as i64 + 1, p))
                .collect();
            HttpResponse::Ok().json(json!({ "success": true, "players": entries }))
        }
        Err(e) => {
            log::error!("player search failed: {e}");
            HttpResponse::Ok().json(json!({ "success": true, "players": [] }))
        }
    }
}

//////////////////////////////////////////////////
// GET /api/stats
//////////////////////////////////////////////////
#[get("/stats")]
pub async fn global_stats(db: web::Data<SqlitePool>) -> impl Responder {
    let key = STATS_KEY.to_string();
    if let Some(cached) = STATS.get(&key) {
        return HttpResponse::Ok().json(cached);
    }

    let stats = match player_repo::global_stats(&db).await {
        Ok(s) => s,
        Err(e) => {
            log::error!("global stats query failed: {e}");
            return HttpResponse::Ok().json(stats_body(&GlobalStats::default()));
        }
    };
    let body = stats_body(&stats);
    STATS.set(key, body.clone());
    HttpResponse::Ok().json(body)
}

fn stats_body(stats: &GlobalStats) -> Value {
    json!({ "success": true, "stats": stats })
}

/// Mounts the leaderboard routes under `/api`
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(leaderboard).service(search).service(global_stats);
}
