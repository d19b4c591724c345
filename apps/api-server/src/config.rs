//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use writeflow_infra::JwtConfig;

/// Default number of posts on the home-page highlights strip.
pub const DEFAULT_HIGHLIGHTS_LIMIT: usize = 5;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseSettings>,
    pub jwt: JwtConfig,
    pub rate_limit_enabled: bool,
    /// Key the rate limiter on `Forwarded`/`X-Forwarded-For` instead of the
    /// socket address. Only safe behind a proxy that overwrites them.
    pub trust_proxy_headers: bool,
    pub highlights_limit: usize,
}

/// Connection settings for PostgreSQL. Absent `DATABASE_URL` means in-memory mode.
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub run_migrations: bool,
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| v != "false" && v != "0")
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseSettings {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS", 20),
            min_connections: parsed("DB_MIN_CONNECTIONS", 2),
            run_migrations: flag("RUN_MIGRATIONS", false),
        });

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT", 8080),
            database,
            jwt: JwtConfig::from_env(),
            rate_limit_enabled: flag("RATE_LIMIT_ENABLED", true),
            trust_proxy_headers: flag("RATE_LIMIT_TRUST_PROXY", false),
            highlights_limit: parsed("HIGHLIGHTS_LIMIT", DEFAULT_HIGHLIGHTS_LIMIT),
        }
    }
}

#[cfg(feature = "postgres")]
impl From<&DatabaseSettings> for writeflow_infra::DatabaseConfig {
    fn from(settings: &DatabaseSettings) -> Self {
        let mut config = writeflow_infra::DatabaseConfig::new(settings.url.clone());
        config.max_connections = settings.max_connections;
        config.min_connections = settings.min_connections;
        config
    }
}
