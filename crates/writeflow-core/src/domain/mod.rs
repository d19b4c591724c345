//! Blog posts, accounts and reactions, plus the read models the feeds are built from.

mod feed;
mod post;
mod reaction;
mod user;

pub use feed::{AuthorRef, PostDetail, PostSummary};
pub use post::Post;
pub use reaction::{ReactionKind, ReactionOutcome, Reactions};
pub use user::User;
