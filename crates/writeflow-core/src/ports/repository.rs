use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Post, PostDetail, PostSummary, ReactionKind, ReactionOutcome, User};
use crate::error::RepoError;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
///
/// Deleting a user also removes their posts and reactions.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their login handle.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post store.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Every post with author name and reaction counts, in no particular order.
    async fn list_summaries(&self) -> Result<Vec<PostSummary>, RepoError>;

    /// A post with its counts and the viewer's own reaction flags.
    async fn find_detail(
        &self,
        post_id: Uuid,
        viewer: Uuid,
    ) -> Result<Option<PostDetail>, RepoError>;

    /// Atomically clear the opposite reaction and flip the requested one.
    ///
    /// Returns `RepoError::NotFound` if the post does not exist and
    /// `RepoError::Conflict` if the user does not.
    async fn toggle_reaction(
        &self,
        post_id: Uuid,
        user_id: Uuid,
        kind: ReactionKind,
    ) -> Result<ReactionOutcome, RepoError>;
}
