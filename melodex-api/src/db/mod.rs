//! Queries over the committed schema

pub mod likes;
pub mod stats;
