//! Read models assembled by the post store for listing and detail views.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Post, User};
use crate::ranking::Rankable;

/// The public face of a post's author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorRef {
    pub id: Uuid,
    pub name: String,
}

impl From<&User> for AuthorRef {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
        }
    }
}

/// Feed item: a post with its reaction counts aggregated at query time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author: AuthorRef,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    pub like_count: u64,
    pub dislike_count: u64,
}

impl Rankable for PostSummary {
    fn like_count(&self) -> u64 {
        self.like_count
    }

    fn dislike_count(&self) -> u64 {
        self.dislike_count
    }

    fn effective_timestamp(&self) -> Option<DateTime<Utc>> {
        Some(self.published_at.unwrap_or(self.created_at))
    }
}

/// A single post as seen by a specific viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostDetail {
    pub post: Post,
    pub author: AuthorRef,
    pub like_count: u64,
    pub dislike_count: u64,
    pub liked_by_viewer: bool,
    pub disliked_by_viewer: bool,
}
