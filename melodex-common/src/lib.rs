//! # Melodex Common Library
//!
//! Shared code for the melodex services:
//! - Error types
//! - Configuration resolution
//! - Database bootstrap and schema

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
