//! SeaORM entities for the WriteFlow schema.

pub mod post;
pub mod post_dislike;
pub mod post_like;
pub mod user;
