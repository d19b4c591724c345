//! Session tokens and password hashing.

use uuid::Uuid;

/// What a verified session token says about its bearer.
#[derive(Debug, Clone)]
pub struct SessionClaims {
    pub user_id: Uuid,
    pub username: String,
    /// Unix seconds.
    pub expires_at: i64,
}

pub trait TokenService: Send + Sync {
    /// Sign a session token for `user_id`.
    fn issue(&self, user_id: Uuid, username: &str) -> Result<String, AuthError>;

    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError>;

    /// Seconds a freshly issued token stays valid.
    fn ttl_seconds(&self) -> i64;
}

pub trait PasswordService: Send + Sync {
    fn hash(&self, password: &str) -> Result<String, AuthError>;

    /// `Ok(false)` on mismatch; `Err` only when `hash` is unreadable.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError>;
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("username or password is incorrect")]
    BadCredentials,

    #[error("session expired")]
    Expired,

    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("no token in the Authorization header")]
    MissingToken,

    #[error("password hashing failed: {0}")]
    Hashing(String),
}
