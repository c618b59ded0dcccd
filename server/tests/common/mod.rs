// tests/common/mod.rs

#![allow(dead_code)]

use leaderboard_server::db::{self, models::Player, player_repo};
use leaderboard_server::db::player_repo::{EconomyGrant, StatsEdit};
use sqlx::SqlitePool;

pub async fn pool() -> SqlitePool {
    db::connect_in_memory().await.expect("in-memory db")
}

pub async fn player(db: &SqlitePool, nickname: &str) -> Player {
    player_repo::create(db, nickname, None)
        .await
        .expect("create player")
}

/// Player with the given balance and no other stats.
pub async fn rich_player(db: &SqlitePool, nickname: &str, coins: i64, reputation: i64) -> Player {
    let p = player(db, nickname).await;
    player_repo::grant_economy(
        db,
        p.id,
        EconomyGrant {
            coins,
            reputation,
            karma: 0,
        },
    )
    .await
    .expect("grant balance")
}

pub async fn set_kills(db: &SqlitePool, id: i64, kills: i64) -> Player {
    player_repo::update_stats(
        db,
        id,
        &StatsEdit {
            kills: Some(kills),
            ..StatsEdit::default()
        },
    )
    .await
    .expect("update kills")
}
