//! Per-process request throttling.

mod memory;

pub use memory::{InMemoryRateLimiter, RateLimitConfig};
