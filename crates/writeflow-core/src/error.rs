//! Error types of the domain and storage layers.

use thiserror::Error;
use uuid::Uuid;

/// Broken business rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("user {user_id} is not the author of post {post_id}")]
    NotAuthor { post_id: Uuid, user_id: Uuid },

    #[error("post title must not be blank")]
    BlankTitle,
}

/// Storage failures, shared by every repository backend.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("storage unavailable: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("record not found")]
    NotFound,

    /// Uniqueness or reference rule rejected the write.
    #[error("conflicting write: {0}")]
    Conflict(String),
}
