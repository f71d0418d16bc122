//! Seeding and import of Pokémon records.
//!
//! [`seed_pokemon`] is the only code path that writes to the store. It keeps
//! the `pokemon`, `types` and `pokemon_types` tables consistent by applying a
//! whole batch of records inside a single transaction.

use std::path::Path;

use pokedex_core::{Error, PokemonId, Result};
use rusqlite::{Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

/// Base URL of the PokeAPI sprite repository.
pub const SPRITE_BASE_URL: &str =
    "https://raw.githubusercontent.com/PokeAPI/sprites/master/sprites/pokemon";

/// Sprite URL for a national dex number.
pub fn sprite_url(id: PokemonId) -> String {
    format!("{SPRITE_BASE_URL}/{id}.png")
}

/// One Pokémon to insert or update, with the names of its types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedRecord {
    pub id: PokemonId,
    pub name: String,
    pub sprite: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Counts of rows touched by a seeding run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub pokemon_created: usize,
    pub pokemon_updated: usize,
    pub types_created: usize,
    pub links_created: usize,
}

const BUILTIN: &[(i64, &str, &[&str])] = &[
    (1, "Bulbasaur", &["grass", "poison"]),
    (4, "Charmander", &["fire"]),
    (7, "Squirtle", &["water"]),
    (25, "Pikachu", &["electric"]),
    (94, "Gengar", &["ghost", "poison"]),
    (143, "Snorlax", &["normal"]),
    (150, "Mewtwo", &["psychic"]),
    (151, "Mew", &["psychic"]),
];

/// The eight built-in records.
pub fn builtin_records() -> Vec<SeedRecord> {
    BUILTIN
        .iter()
        .map(|&(id, name, types)| {
            let id = PokemonId::from(id);
            SeedRecord {
                id,
                name: name.to_string(),
                sprite: sprite_url(id),
                types: types.iter().map(|t| t.to_string()).collect(),
            }
        })
        .collect()
}

/// Read a JSON array of [`SeedRecord`]s from disk.
pub fn load_seed_file(path: &Path) -> Result<Vec<SeedRecord>> {
    let contents = std::fs::read_to_string(path)?;
    let records: Vec<SeedRecord> = serde_json::from_str(&contents).map_err(|e| {
        Error::validation(format!("invalid seed file {}: {e}", path.display()))
    })?;
    validate_records(&records)?;
    Ok(records)
}

fn validate_records(records: &[SeedRecord]) -> Result<()> {
    for (i, r) in records.iter().enumerate() {
        if r.name.is_empty() {
            return Err(Error::validation(format!("record {i}: name is required")));
        }
        if r.sprite.is_empty() {
            return Err(Error::validation(format!(
                "record {i} ({}): sprite is required",
                r.name
            )));
        }
        if r.types.iter().any(String::is_empty) {
            return Err(Error::validation(format!(
                "record {i} ({}): type names must not be empty",
                r.name
            )));
        }
    }
    Ok(())
}

/// Insert or update `records` in one transaction.
///
/// Types are created when missing. A Pokémon whose name already exists keeps
/// its id and only has its sprite refreshed. Memberships are added when
/// missing and never removed.
pub fn seed_pokemon(conn: &Connection, records: &[SeedRecord]) -> Result<SeedReport> {
    validate_records(records)?;

    let tx = conn
        .unchecked_transaction()
        .map_err(|e| Error::database(e.to_string()))?;
    let mut report = SeedReport::default();

    for record in records {
        for type_name in &record.types {
            report.types_created += tx
                .execute(
                    "INSERT INTO types (name) VALUES (?1) ON CONFLICT(name) DO NOTHING",
                    [type_name],
                )
                .map_err(|e| Error::database(e.to_string()))?;
        }
    }

    for record in records {
        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM pokemon WHERE name = ?1",
                [&record.name],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| Error::database(e.to_string()))?;

        let pokemon_id = match existing {
            Some(id) => {
                tx.execute(
                    "UPDATE pokemon SET sprite = ?1 WHERE id = ?2",
                    rusqlite::params![record.sprite, id],
                )
                .map_err(|e| Error::database(e.to_string()))?;
                report.pokemon_updated += 1;
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO pokemon (id, name, sprite) VALUES (?1, ?2, ?3)",
                    rusqlite::params![record.id.get(), record.name, record.sprite],
                )
                .map_err(|e| Error::database(format!("insert {}: {e}", record.name)))?;
                report.pokemon_created += 1;
                record.id.get()
            }
        };

        for type_name in &record.types {
            report.links_created += tx
                .execute(
                    "INSERT OR IGNORE INTO pokemon_types (pokemon_id, type_id)
                     SELECT ?1, id FROM types WHERE name = ?2",
                    rusqlite::params![pokemon_id, type_name],
                )
                .map_err(|e| Error::database(e.to_string()))?;
        }
    }

    tx.commit().map_err(|e| Error::database(e.to_string()))?;

    tracing::debug!(
        created = report.pokemon_created,
        updated = report.pokemon_updated,
        types = report.types_created,
        links = report.links_created,
        "Seeded Pokémon records"
    );

    Ok(report)
}

/// Seed the built-in records.
pub fn seed_builtin(conn: &Connection) -> Result<SeedReport> {
    seed_pokemon(conn, &builtin_records())
}

/// Seed the built-in records only when the store holds no Pokémon yet.
pub fn seed_if_empty(conn: &Connection) -> Result<Option<SeedReport>> {
    if crate::queries::pokemon::count_pokemon(conn)? > 0 {
        return Ok(None);
    }
    seed_builtin(conn).map(Some)
}
