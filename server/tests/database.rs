// tests/database.rs

use leaderboard_server::db;

#[tokio::test]
async fn file_database_uses_wal_and_foreign_keys() {
    let path = std::env::temp_dir().join(format!("leaderboard-wal-{}.db", std::process::id()));
    let url = format!("sqlite://{}", path.display());

    let pool = db::open(&url, 2).await.unwrap();
    let mode: String = sqlx::query_scalar("PRAGMA journal_mode")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(mode.to_lowercase(), "wal");

    let fk: i64 = sqlx::query_scalar("PRAGMA foreign_keys")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(fk, 1);

    pool.close().await;
    for suffix in ["", "-wal", "-shm"] {
        let _ = std::fs::remove_file(format!("{}{suffix}", path.display()));
    }
}
