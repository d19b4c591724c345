//! Application state - shared across all handlers.

use std::sync::Arc;

use actix_web::web;

use writeflow_core::ports::{
    PasswordService, PostRepository, RateLimiter, TokenService, UserRepository,
};
use writeflow_infra::{Argon2PasswordService, InMemoryStore, JwtTokenService};

use crate::config::AppConfig;

/// Conditions that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[cfg_attr(not(feature = "postgres"), allow(dead_code))]
    #[error("database migrations failed: {0}")]
    Migration(String),
}

type Repositories = (Arc<dyn UserRepository>, Arc<dyn PostRepository>);

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub tokens: Arc<dyn TokenService>,
    pub passwords: Arc<dyn PasswordService>,
    pub rate_limiter: Option<Arc<dyn RateLimiter>>,
    pub highlights_limit: usize,
}

impl AppState {
    /// Build the application state with appropriate implementations.
    ///
    /// An unreachable database falls back to the in-memory store; a reachable
    /// one that cannot be migrated is fatal.
    pub async fn new(config: &AppConfig) -> Result<Self, StartupError> {
        let (users, posts) = Self::repositories(config).await?;

        Ok(Self {
            users,
            posts,
            tokens: Arc::new(JwtTokenService::new(config.jwt.clone())),
            passwords: Arc::new(Argon2PasswordService::new()),
            rate_limiter: Self::rate_limiter(config),
            highlights_limit: config.highlights_limit,
        })
    }

    /// State backed by a fresh in-memory store.
    pub fn in_memory(
        tokens: Arc<dyn TokenService>,
        passwords: Arc<dyn PasswordService>,
        highlights_limit: usize,
    ) -> Self {
        let store = InMemoryStore::new();
        Self {
            users: Arc::new(store.users()),
            posts: Arc::new(store.posts()),
            tokens,
            passwords,
            rate_limiter: None,
            highlights_limit,
        }
    }

    /// Register the state as app data.
    ///
    /// The `Identity` extractor looks up `Arc<dyn TokenService>` on its own.
    pub fn register(&self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.clone()))
            .app_data(web::Data::new(self.tokens.clone()));
    }

    #[cfg(feature = "postgres")]
    async fn repositories(config: &AppConfig) -> Result<Repositories, StartupError> {
        use writeflow_infra::database::{self, DatabaseConfig};
        use writeflow_infra::{PostgresPostRepository, PostgresUserRepository};

        let Some(settings) = &config.database else {
            tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
            return Ok(Self::memory_repositories());
        };

        let conn = match database::connect(&DatabaseConfig::from(settings)).await {
            Ok(conn) => conn,
            Err(e) => {
                tracing::error!(
                    "Failed to connect to database: {}. Using in-memory fallback.",
                    e
                );
                return Ok(Self::memory_repositories());
            }
        };

        if settings.run_migrations {
            migrate(&conn).await?;
        }

        Ok((
            Arc::new(PostgresUserRepository::new(conn.clone())),
            Arc::new(PostgresPostRepository::new(conn)),
        ))
    }

    #[cfg(not(feature = "postgres"))]
    async fn repositories(_config: &AppConfig) -> Result<Repositories, StartupError> {
        tracing::info!("Running without postgres feature - using in-memory store");
        Ok(Self::memory_repositories())
    }

    fn memory_repositories() -> Repositories {
        let store = InMemoryStore::new();
        (Arc::new(store.users()), Arc::new(store.posts()))
    }

    #[cfg(feature = "rate-limit")]
    fn rate_limiter(config: &AppConfig) -> Option<Arc<dyn RateLimiter>> {
        use writeflow_infra::{InMemoryRateLimiter, RateLimitConfig};

        if !config.rate_limit_enabled {
            return None;
        }

        let limits = RateLimitConfig::from_env();
        match InMemoryRateLimiter::new(limits.clone()) {
            Ok(limiter) => {
                tracing::info!(
                    max_requests = limits.max_requests,
                    window_secs = limits.window.as_secs(),
                    "Rate limiting enabled"
                );
                Some(Arc::new(limiter))
            }
            Err(e) => {
                tracing::error!("Invalid rate limit configuration: {}. Rate limiting disabled.", e);
                None
            }
        }
    }

    #[cfg(not(feature = "rate-limit"))]
    fn rate_limiter(_config: &AppConfig) -> Option<Arc<dyn RateLimiter>> {
        None
    }
}

#[cfg(feature = "postgres")]
async fn migrate(conn: &writeflow_infra::database::DbConn) -> Result<(), StartupError> {
    use migration::{Migrator, MigratorTrait};

    Migrator::up(conn, None).await.map_err(|e| {
        tracing::error!("Failed to apply migrations: {}", e);
        StartupError::Migration(e.to_string())
    })?;
    tracing::info!("Database migrations applied");
    Ok(())
}
