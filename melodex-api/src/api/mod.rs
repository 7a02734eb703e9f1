//! HTTP handlers

pub mod health;
pub mod likes;
pub mod stats;
