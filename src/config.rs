// Server configuration from environment variables
//
// DATABASE_PATH   DuckDB file (":memory:" for a throwaway database)
// PORT            listen port
// CACHE_TTL_SECS  item cache time-to-live
// CACHE_CAPACITY  item cache max entries
// SEED_DATA       insert dummy items/users into empty tables ("0"/"false" disables)

use std::time::Duration;

pub const DEFAULT_DATABASE_PATH: &str = "workspace_api.duckdb";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 300;
pub const DEFAULT_CACHE_CAPACITY: u64 = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub database_path: String,
    pub port: u16,
    pub cache_ttl: Duration,
    pub cache_capacity: u64,
    pub seed_data: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_path: DEFAULT_DATABASE_PATH.to_string(),
            port: DEFAULT_PORT,
            cache_ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            seed_data: true,
        }
    }
}

impl ServerConfig {
    /// In-memory database, seeded, default cache. Used by tests.
    pub fn in_memory() -> Self {
        Self {
            database_path: ":memory:".to_string(),
            ..Self::default()
        }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Unparseable values fall back to the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let database_path = lookup("DATABASE_PATH")
            .filter(|p| !p.trim().is_empty())
            .unwrap_or(defaults.database_path);

        let port = lookup("PORT")
            .and_then(|p| p.trim().parse().ok())
            .unwrap_or(defaults.port);

        let cache_ttl = lookup("CACHE_TTL_SECS")
            .and_then(|s| s.trim().parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.cache_ttl);

        let cache_capacity = lookup("CACHE_CAPACITY")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.cache_capacity);

        let seed_data = lookup("SEED_DATA")
            .map(|s| !matches!(s.trim().to_ascii_lowercase().as_str(), "0" | "false"))
            .unwrap_or(defaults.seed_data);

        Self {
            database_path,
            port,
            cache_ttl,
            cache_capacity,
            seed_data,
        }
    }
}
