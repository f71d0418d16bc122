//! Query service: the four read operations behind the procedure surface.
//!
//! Each call checks a connection out of the pool, reads Pokémon rows, resolves
//! their type names through the join table and flattens both into
//! [`PokemonDto`]s. Nothing is cached.

use pokedex_core::{Error, PokemonId, Result};
use pokedex_db::models::Pokemon;
use pokedex_db::pool::{get_conn, DbPool};
use pokedex_db::queries::{pokemon, types};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};

/// Flat client-facing representation of a Pokémon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PokemonDto {
    #[schema(value_type = i64, example = 25)]
    pub id: PokemonId,
    #[schema(example = "Pikachu")]
    pub name: String,
    /// Type names, in type insertion order.
    pub types: Vec<String>,
    pub sprite: String,
}

/// Read-only operations over the Pokémon store.
#[derive(Clone)]
pub struct QueryService {
    db: DbPool,
}

impl QueryService {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    /// Look up exactly one Pokémon by its stored name.
    pub fn lookup_by_name(&self, name: &str) -> Result<PokemonDto> {
        let conn = get_conn(&self.db)?;
        let found = pokemon::get_pokemon_by_name(&conn, name)?
            .ok_or_else(|| Error::not_found("Pokemon", name))?;
        let mut dtos = to_dtos(&conn, vec![found])?;
        dtos.pop()
            .ok_or_else(|| Error::Internal(format!("lost row for Pokemon {name}")))
    }

    /// Look up every Pokémon whose name is in `names`; misses are skipped.
    pub fn lookup_by_names(&self, names: &[String]) -> Result<Vec<PokemonDto>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }
        let conn = get_conn(&self.db)?;
        let found = pokemon::list_pokemon_by_names(&conn, names)?;
        to_dtos(&conn, found)
    }

    /// List all Pokémon, or only those of the named type.
    ///
    /// An empty type name counts as no filter. An unknown type yields an
    /// empty list.
    pub fn list_by_type(&self, type_name: Option<&str>) -> Result<Vec<PokemonDto>> {
        let conn = get_conn(&self.db)?;
        let found = match type_name.filter(|t| !t.is_empty()) {
            None => pokemon::list_pokemon(&conn)?,
            Some(name) => match types::get_type_by_name(&conn, name)? {
                Some(t) => pokemon::list_pokemon_by_type(&conn, t.id)?,
                None => return Ok(Vec::new()),
            },
        };
        to_dtos(&conn, found)
    }

    /// Names of all types.
    pub fn list_types(&self) -> Result<Vec<String>> {
        let conn = get_conn(&self.db)?;
        Ok(types::list_types(&conn)?
            .into_iter()
            .map(|t| t.name)
            .collect())
    }
}

fn to_dtos(conn: &Connection, rows: Vec<Pokemon>) -> Result<Vec<PokemonDto>> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<PokemonId> = rows.iter().map(|p| p.id).collect();
    let mut type_names = types::type_names_by_pokemon(conn, &ids)?;

    Ok(rows
        .into_iter()
        .map(|p| PokemonDto {
            types: type_names.remove(&p.id).unwrap_or_default(),
            id: p.id,
            name: p.name,
            sprite: p.sprite,
        })
        .collect())
}
