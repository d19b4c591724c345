//! Storage, auth and throttling backends for `writeflow-core`.
//!
//! The in-memory store is always built. Cargo features switch on the rest:
//!
//! | feature | adds |
//! |---|---|
//! | `postgres` | SeaORM repositories |
//! | `auth` | `JwtTokenService`, `Argon2PasswordService` |
//! | `rate-limit` | governor-backed `InMemoryRateLimiter` |
//!
//! `full` (the default) enables all three; `minimal` none.

pub mod memory;

#[cfg(feature = "postgres")]
pub mod database;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

pub use memory::{InMemoryPostRepository, InMemoryStore, InMemoryUserRepository};

#[cfg(feature = "postgres")]
pub use database::{DatabaseConfig, PostgresPostRepository, PostgresUserRepository};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtConfig, JwtTokenService};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};
