//! Periodic upkeep: quest rollovers and booster expiry.

use anyhow::Context;
use chrono::Utc;
use sqlx::SqlitePool;
use tokio::time::{sleep, Duration};

use crate::config::settings;
use crate::db::{quest_repo, shop_repo};

async fn tick(db: &SqlitePool) -> anyhow::Result<()> {
    let refreshed = quest_repo::refresh_due(db, Utc::now())
        .await
        .context("refreshing quests")?;
    if refreshed > 0 {
        log::info!("rolled over {refreshed} quest(s)");
    }

    let expired = shop_repo::expire_boosters(db)
        .await
        .context("expiring boosters")?;
    if expired > 0 {
        log::debug!("deactivated {expired} expired booster(s)");
    }
    Ok(())
}

pub async fn run(db: SqlitePool) {
    let every = Duration::from_secs(settings().quest_refresh_interval.max(1));
    loop {
        if let Err(e) = tick(&db).await {
            log::warn!("upkeep tick failed: {e:#}");
        }
        sleep(every).await;
    }
}

pub fn start(db: SqlitePool) {
    tokio::spawn(run(db));
}
