//! Pokémon read queries.
//!
//! Every list query orders by primary key so repeated reads over an
//! unchanged store return rows in the same order.

use std::collections::BTreeSet;

use pokedex_core::{Error, Result, TypeId};
use rusqlite::Connection;

use crate::models::Pokemon;

/// Upper bound on bound parameters per `IN (...)` query, well below SQLite's
/// compile-time limit.
pub(crate) const MAX_BIND_PARAMS: usize = 500;

/// `?, ?, ?` placeholder list for an `IN (...)` clause.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Get a Pokémon by exact name. No trimming or case folding is applied.
pub fn get_pokemon_by_name(conn: &Connection, name: &str) -> Result<Option<Pokemon>> {
    let result = conn.query_row(
        "SELECT id, name, sprite FROM pokemon WHERE name = ?1",
        [name],
        Pokemon::from_row,
    );
    match result {
        Ok(p) => Ok(Some(p)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List the Pokémon whose name appears in `names`, ordered by id.
///
/// Duplicate names collapse; names without a match are skipped. An empty
/// input returns an empty list without querying.
pub fn list_pokemon_by_names(conn: &Connection, names: &[String]) -> Result<Vec<Pokemon>> {
    let unique: BTreeSet<&str> = names.iter().map(String::as_str).collect();
    if unique.is_empty() {
        return Ok(Vec::new());
    }

    let unique: Vec<&str> = unique.into_iter().collect();
    let mut found = Vec::new();
    for chunk in unique.chunks(MAX_BIND_PARAMS) {
        let sql = format!(
            "SELECT id, name, sprite FROM pokemon WHERE name IN ({}) ORDER BY id",
            placeholders(chunk.len())
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| Error::database(e.to_string()))?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(chunk.iter()), Pokemon::from_row)
            .map_err(|e| Error::database(e.to_string()))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::database(e.to_string()))?;
        found.extend(rows);
    }

    found.sort_by_key(|p| p.id);
    Ok(found)
}

/// List all Pokémon ordered by id.
pub fn list_pokemon(conn: &Connection) -> Result<Vec<Pokemon>> {
    let mut stmt = conn
        .prepare("SELECT id, name, sprite FROM pokemon ORDER BY id")
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], Pokemon::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// List the Pokémon linked to a type, ordered by id.
pub fn list_pokemon_by_type(conn: &Connection, type_id: TypeId) -> Result<Vec<Pokemon>> {
    let mut stmt = conn
        .prepare(
            "SELECT p.id, p.name, p.sprite
             FROM pokemon p
             JOIN pokemon_types pt ON pt.pokemon_id = p.id
             WHERE pt.type_id = ?1
             ORDER BY p.id",
        )
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([type_id.get()], Pokemon::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Count stored Pokémon.
pub fn count_pokemon(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM pokemon", [], |row| row.get(0))
        .map_err(|e| Error::database(e.to_string()))
}
