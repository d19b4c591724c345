//! Request guards: identity extraction, error rendering and throttling.

pub mod auth;
pub mod error;
pub mod rate_limit;

pub use rate_limit::RateLimitMiddleware;
