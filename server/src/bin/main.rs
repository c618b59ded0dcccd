use actix_web::{middleware::Logger, web, App, HttpServer};
use anyhow::Context;
use leaderboard_server::{config::settings, db, http, metrics, tasks};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cfg = settings();
    if cfg.admin_password.is_empty() {
        log::warn!("ADMIN_PASSWORD not set; admin login is disabled");
    }

    // SQLite pool, schema brought up to date
    let db_pool = db::connect().await.context("connecting to database")?;

    // quest rollovers + booster expiry
    tasks::start(db_pool.clone());

    log::info!("listening on {}", cfg.server_addr);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(metrics::METRICS.clone())
            .app_data(web::Data::new(db_pool.clone()))
            .configure(http::routes::init_routes)
    })
    .bind(&cfg.server_addr)
    .with_context(|| format!("binding {}", cfg.server_addr))?
    .run()
    .await
    .context("running http server")
}
