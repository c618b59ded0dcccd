//! Prometheus metrics & middleware helper.
//!
//! HTTP request metrics come from the actix middleware at `/metrics`; the
//! game counters live in their own registry served at `/api/metrics/game`.

use actix_web::{get, web, HttpResponse, Responder};
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

/// Global Prometheus handle reused in tests.
pub static METRICS: Lazy<PrometheusMetrics> = Lazy::new(|| {
    PrometheusMetricsBuilder::new("api")
        .endpoint("/metrics")
        .build()
        .expect("metrics builder")
});

pub static GAME_REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new_custom(Some("leaderboard".into()), None)
        .expect("static registry prefix");
    for counter in [&*PURCHASES, &*QUESTS_COMPLETED, &*ACHIEVEMENTS_EARNED] {
        if let Err(e) = registry.register(Box::new(counter.clone())) {
            log::warn!("metric registration failed: {e}");
        }
    }
    registry
});

fn counter(name: &str, help: &str, label: &str) -> IntCounterVec {
    IntCounterVec::new(Opts::new(name, help), &[label]).expect("static metric definition")
}

/// Shop purchases by item category.
pub static PURCHASES: Lazy<IntCounterVec> =
    Lazy::new(|| counter("shop_purchases_total", "Completed shop purchases", "category"));

/// Quest completions by quest category.
pub static QUESTS_COMPLETED: Lazy<IntCounterVec> =
    Lazy::new(|| counter("quests_completed_total", "Quests completed", "category"));

/// Achievements earned, by how they were earned (sweep / grant).
pub static ACHIEVEMENTS_EARNED: Lazy<IntCounterVec> =
    Lazy::new(|| counter("achievements_earned_total", "Achievements earned", "source"));

#[get("/metrics/game")]
pub async fn game_metrics() -> impl Responder {
    let mut buf = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(e) = encoder.encode(&GAME_REGISTRY.gather(), &mut buf) {
        log::error!("encoding game metrics: {e}");
        return HttpResponse::InternalServerError().finish();
    }
    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buf)
}

pub fn init_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(game_metrics);
}
