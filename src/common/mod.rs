//! Common types and utilities shared across the crate.
//!
//! - Configuration constants
//! - Error types
//! - The validated [`Degree`]

pub mod config;
mod degree;
pub mod error;

pub use degree::Degree;
pub use error::{Error, Result};
