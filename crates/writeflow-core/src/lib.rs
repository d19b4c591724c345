//! Domain model of the WriteFlow blogging backend.
//!
//! Entities, the engagement ranker that orders the feeds, and the ports that
//! storage and auth backends implement. Nothing here touches I/O.

pub mod domain;
pub mod error;
pub mod ports;
pub mod ranking;

pub use error::DomainError;
pub use ranking::{Rankable, rank, rank_indices, top};
