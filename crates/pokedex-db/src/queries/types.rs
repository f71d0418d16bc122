//! Pokémon type queries, including the join from Pokémon to type names.

use std::collections::HashMap;

use pokedex_core::{Error, PokemonId, Result};
use rusqlite::Connection;

use crate::models::{Membership, PokemonType};
use crate::queries::pokemon::{placeholders, MAX_BIND_PARAMS};

/// Get a type by exact name.
pub fn get_type_by_name(conn: &Connection, name: &str) -> Result<Option<PokemonType>> {
    let result = conn.query_row(
        "SELECT id, name FROM types WHERE name = ?1",
        [name],
        PokemonType::from_row,
    );
    match result {
        Ok(t) => Ok(Some(t)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(Error::database(e.to_string())),
    }
}

/// List all types in insertion order.
pub fn list_types(conn: &Connection) -> Result<Vec<PokemonType>> {
    let mut stmt = conn
        .prepare("SELECT id, name FROM types ORDER BY id")
        .map_err(|e| Error::database(e.to_string()))?;
    let rows = stmt
        .query_map([], PokemonType::from_row)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;
    Ok(rows)
}

/// Resolve the type names of each given Pokémon.
///
/// Names within one Pokémon are in type insertion order. Pokémon without any
/// type have no entry in the returned map.
pub fn type_names_by_pokemon(
    conn: &Connection,
    ids: &[PokemonId],
) -> Result<HashMap<PokemonId, Vec<String>>> {
    let mut by_pokemon: HashMap<PokemonId, Vec<String>> = HashMap::new();

    for chunk in ids.chunks(MAX_BIND_PARAMS) {
        let sql = format!(
            "SELECT pt.pokemon_id, t.name
             FROM pokemon_types pt
             JOIN types t ON t.id = pt.type_id
             WHERE pt.pokemon_id IN ({})
             ORDER BY pt.pokemon_id, t.id",
            placeholders(chunk.len())
        );
        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| Error::database(e.to_string()))?;
        let memberships = stmt
            .query_map(
                rusqlite::params_from_iter(chunk.iter().map(|id| id.get())),
                Membership::from_row,
            )
            .map_err(|e| Error::database(e.to_string()))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::database(e.to_string()))?;

        for m in memberships {
            by_pokemon.entry(m.pokemon_id).or_default().push(m.type_name);
        }
    }

    Ok(by_pokemon)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::init_memory_pool;
    use crate::seed::seed_builtin;

    #[test]
    fn list_types_distinct_in_insertion_order() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        seed_builtin(&conn).unwrap();

        let names: Vec<String> = list_types(&conn)
            .unwrap()
            .into_iter()
            .map(|t| t.name)
            .collect();
        assert_eq!(
            names,
            vec!["grass", "poison", "fire", "water", "electric", "ghost", "normal", "psychic"]
        );
    }

    #[test]
    fn get_type_by_exact_name() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        seed_builtin(&conn).unwrap();

        assert!(get_type_by_name(&conn, "psychic").unwrap().is_some());
        assert!(get_type_by_name(&conn, "Psychic").unwrap().is_none());
        assert!(get_type_by_name(&conn, "dragon").unwrap().is_none());
    }

    #[test]
    fn type_names_grouped_per_pokemon() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        seed_builtin(&conn).unwrap();

        let ids = [PokemonId::from(1), PokemonId::from(25), PokemonId::from(94)];
        let map = type_names_by_pokemon(&conn, &ids).unwrap();
        assert_eq!(map[&PokemonId::from(1)], vec!["grass", "poison"]);
        assert_eq!(map[&PokemonId::from(25)], vec!["electric"]);
        assert_eq!(map[&PokemonId::from(94)], vec!["poison", "ghost"]);
    }

    #[test]
    fn type_names_for_untyped_pokemon() {
        let pool = init_memory_pool().unwrap();
        let conn = pool.get().unwrap();
        conn.execute(
            "INSERT INTO pokemon (id, name, sprite) VALUES (0, 'Missingno', 'x')",
            [],
        )
        .unwrap();

        let map = type_names_by_pokemon(&conn, &[PokemonId::from(0)]).unwrap();
        assert!(map.is_empty());
    }
}
