//! Like/dislike reactions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two mutually exclusive reactions a user can leave on a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionKind {
    Like,
    Dislike,
}

impl ReactionKind {
    pub fn opposite(self) -> Self {
        match self {
            ReactionKind::Like => ReactionKind::Dislike,
            ReactionKind::Dislike => ReactionKind::Like,
        }
    }
}

/// Result of toggling a reaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionOutcome {
    /// The reaction that was toggled.
    pub kind: ReactionKind,
    /// Whether the reaction is now set (`true`) or was removed (`false`).
    pub active: bool,
}

impl ReactionOutcome {
    pub fn liked(&self) -> bool {
        self.active && self.kind == ReactionKind::Like
    }

    pub fn disliked(&self) -> bool {
        self.active && self.kind == ReactionKind::Dislike
    }
}

/// Liking and disliking sets of a single post.
///
/// A user id is never present in both sets at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reactions {
    likes: HashSet<Uuid>,
    dislikes: HashSet<Uuid>,
}

impl Reactions {
    pub fn new() -> Self {
        Self::default()
    }

    fn set_mut(&mut self, kind: ReactionKind) -> &mut HashSet<Uuid> {
        match kind {
            ReactionKind::Like => &mut self.likes,
            ReactionKind::Dislike => &mut self.dislikes,
        }
    }

    /// Remove the opposite reaction, then flip membership in the requested one.
    pub fn toggle(&mut self, user_id: Uuid, kind: ReactionKind) -> ReactionOutcome {
        self.set_mut(kind.opposite()).remove(&user_id);

        let set = self.set_mut(kind);
        let active = if set.remove(&user_id) {
            false
        } else {
            set.insert(user_id);
            true
        };

        ReactionOutcome { kind, active }
    }

    /// Drop every reaction left by `user_id`.
    pub fn forget(&mut self, user_id: Uuid) {
        self.likes.remove(&user_id);
        self.dislikes.remove(&user_id);
    }

    pub fn like_count(&self) -> u64 {
        self.likes.len() as u64
    }

    pub fn dislike_count(&self) -> u64 {
        self.dislikes.len() as u64
    }

    pub fn has_liked(&self, user_id: Uuid) -> bool {
        self.likes.contains(&user_id)
    }

    pub fn has_disliked(&self, user_id: Uuid) -> bool {
        self.dislikes.contains(&user_id)
    }
}
