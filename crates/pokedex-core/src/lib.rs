//! pokedex-core: shared types, IDs, errors and configuration.
//!
//! This crate is the foundational dependency for the other pokedex crates,
//! providing integer-backed identifiers, a unified error type that knows its
//! HTTP status, and the application configuration.

pub mod config;
pub mod error;
pub mod ids;

// Re-export the most commonly used items at the crate root.
pub use error::{Error, Result};
pub use ids::*;
