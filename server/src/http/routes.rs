use crate::{http, metrics};
use actix_web::web;

/// Mount every HTTP sub-module under `/api`.
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(http::auth::init_routes)
            .configure(http::leaderboard::init_routes)
            .configure(http::players::init_routes)
            .configure(http::ascend::init_routes)
            .configure(http::quests::init_routes)
            .configure(http::achievements::init_routes)
            .configure(http::shop::init_routes)
            .configure(http::inventory::init_routes)
            .configure(http::targets::init_routes)
            .configure(http::candidates::init_routes)
            .configure(http::health::init_routes)
            .configure(metrics::init_routes),
    );
}
