//! Boundaries between the domain and its storage, auth and throttling backends.

mod auth;
mod rate_limit;
mod repository;

pub use auth::{AuthError, PasswordService, SessionClaims, TokenService};
pub use rate_limit::{RateDecision, RateLimitError, RateLimiter};
pub use repository::{BaseRepository, PostRepository, UserRepository};
