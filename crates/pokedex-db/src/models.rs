//! Rust structs mapping to database tables.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row` whose columns follow the field order.

use pokedex_core::{PokemonId, TypeId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Pokemon
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: PokemonId,
    pub name: String,
    pub sprite: String,
}

impl Pokemon {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: PokemonId::from(row.get::<_, i64>(0)?),
            name: row.get(1)?,
            sprite: row.get(2)?,
        })
    }
}

// ---------------------------------------------------------------------------
// PokemonType
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokemonType {
    pub id: TypeId,
    pub name: String,
}

impl PokemonType {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: TypeId::from(row.get::<_, i64>(0)?),
            name: row.get(1)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

/// One row of the `pokemon_types` join, resolved to the type's name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub pokemon_id: PokemonId,
    pub type_name: String,
}

impl Membership {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            pokemon_id: PokemonId::from(row.get::<_, i64>(0)?),
            type_name: row.get(1)?,
        })
    }
}
