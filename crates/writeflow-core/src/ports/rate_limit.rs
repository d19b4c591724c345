//! Request throttling.

use std::time::Duration;

use async_trait::async_trait;

/// Per-client request budget. Keys are client addresses.
#[async_trait]
pub trait RateLimiter: Send + Sync {
    /// Spend one unit of `key`'s budget.
    async fn check(&self, key: &str) -> Result<RateDecision, RateLimitError>;
}

#[derive(Debug, Clone)]
pub struct RateDecision {
    pub allowed: bool,
    /// Requests left in the current burst.
    pub remaining: u32,
    pub retry_in: Duration,
}

#[derive(Debug, thiserror::Error)]
pub enum RateLimitError {
    #[error("rate limiter unavailable: {0}")]
    Unavailable(String),
}
