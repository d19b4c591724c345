//! In-memory post store - used when no database is configured, and in tests.
//!
//! Users, posts and reactions live behind a single async `RwLock`, so every
//! write (including a reaction toggle) is applied atomically.
//! Note: Data is lost on process restart.

mod posts;
mod users;

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use writeflow_core::domain::{Post, Reactions, User};

pub use posts::InMemoryPostRepository;
pub use users::InMemoryUserRepository;

#[derive(Default)]
struct StoreData {
    users: HashMap<Uuid, User>,
    posts: HashMap<Uuid, Post>,
    reactions: HashMap<Uuid, Reactions>,
}

impl StoreData {
    /// Remove a user together with their posts and every reaction they left.
    fn remove_user_cascade(&mut self, user_id: Uuid) -> Option<User> {
        let user = self.users.remove(&user_id)?;

        let authored: Vec<Uuid> = self
            .posts
            .values()
            .filter(|p| p.author_id == user_id)
            .map(|p| p.id)
            .collect();
        for post_id in authored {
            self.posts.remove(&post_id);
            self.reactions.remove(&post_id);
        }

        for reactions in self.reactions.values_mut() {
            reactions.forget(user_id);
        }

        Some(user)
    }
}

/// Shared handle over the in-memory data; hands out repositories that
/// all see the same users, posts and reactions.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    data: Arc<RwLock<StoreData>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn users(&self) -> InMemoryUserRepository {
        InMemoryUserRepository::new(self.data.clone())
    }

    pub fn posts(&self) -> InMemoryPostRepository {
        InMemoryPostRepository::new(self.data.clone())
    }
}
