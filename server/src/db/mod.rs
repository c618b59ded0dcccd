pub mod achievement_repo;
pub mod ascend_repo;
pub mod candidate_repo;
pub mod evaluation;
pub mod migrations;
pub mod models;
pub mod player_repo;
pub mod quest_repo;
pub mod shop_repo;
pub mod target_repo;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

use crate::config::settings;

/// Open the pool configured by `DATABASE_URL` and bring the schema up to date.
pub async fn connect() -> anyhow::Result<SqlitePool> {
    let cfg = settings();
    open(&cfg.database_url, cfg.db_max_connections).await
}

/// File-backed pool in WAL mode with foreign keys enforced.
pub async fn open(url: &str, max_connections: u32) -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(url)
        .with_context(|| format!("parsing DATABASE_URL {url:?}"))?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(opts)
        .await
        .context("opening sqlite pool")?;

    run_migrations(&pool).await?;
    Ok(pool)
}

/// Single-connection in-memory database, used by tests.
pub async fn connect_in_memory() -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    // every connection to :memory: is a separate database, so keep exactly one alive
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(opts)
        .await
        .context("opening in-memory sqlite")?;

    run_migrations(&pool).await?;
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> anyhow::Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name       TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .context("creating _migrations table")?;

    for (name, sql) in migrations::all() {
        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE name = ?)")
                .bind(name)
                .fetch_one(pool)
                .await?;
        if applied {
            log::debug!("migration {name} already applied");
            continue;
        }

        let mut tx = pool.begin().await?;
        sqlx::raw_sql(sql)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("applying migration {name}"))?;
        sqlx::query("INSERT INTO _migrations (name, applied_at) VALUES (?, ?)")
            .bind(name)
            .bind(chrono::Utc::now())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        log::info!("applied migration {name}");
    }
    Ok(())
}
