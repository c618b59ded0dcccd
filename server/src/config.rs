//! Runtime configuration for the leaderboard server.

use once_cell::sync::Lazy;
use std::env;

#[derive(Debug)]
pub struct Settings {
    pub database_url: String,
    pub server_addr: String,
    pub db_max_connections: u32,
    /// Shared secret for the admin login.
    pub admin_password: String,
    /// HS256 key signing session tokens.
    pub session_secret: String,
    pub session_ttl_hours: i64,
    /// Lifetime of cached leaderboard / stats payloads (seconds).
    pub stats_cache_ttl: u64,
    /// Seconds between background quest refresh passes.
    pub quest_refresh_interval: u64,
}

fn var_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default)
}

impl Settings {
    fn from_env() -> Self {
        let session_secret = env::var("SESSION_SECRET").unwrap_or_else(|_| {
            log::warn!("SESSION_SECRET not set; using an insecure development key");
            "dev-session-secret-change-me".into()
        });

        Settings {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://leaderboard.db?mode=rwc".into()),
            server_addr: env::var("SERVER_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".into()),
            db_max_connections: var_or("DB_MAX_CONNECTIONS", 5),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_default(),
            session_secret,
            session_ttl_hours: var_or("SESSION_TTL_HOURS", 24),
            stats_cache_ttl: var_or("STATS_CACHE_TTL", 300),
            quest_refresh_interval: var_or("QUEST_REFRESH_INTERVAL", 600),
        }
    }
}

static SETTINGS: Lazy<Settings> = Lazy::new(Settings::from_env);

pub fn settings() -> &'static Settings {
    &SETTINGS
}
