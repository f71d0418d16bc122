//! Database query modules.

pub mod pokemon;
pub mod types;
