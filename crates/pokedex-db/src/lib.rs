//! pokedex-db: database access and persistence layer.
//!
//! This crate provides SQLite-backed storage with connection pooling,
//! embedded migrations, typed models, read queries for Pokémon and their
//! types, and the seeding path that is the only writer of the store.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
pub mod seed;
