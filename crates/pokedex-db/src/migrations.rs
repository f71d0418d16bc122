//! Embedded schema migrations.
//!
//! Versions are applied in ascending order; the highest applied version is
//! recorded in `schema_migrations`.

use pokedex_core::{Error, Result};
use rusqlite::Connection;

/// V1: initial schema -- Pokémon, types and their many-to-many link.
const V1_INITIAL: &str = r#"
CREATE TABLE pokemon (
    id     INTEGER PRIMARY KEY,
    name   TEXT UNIQUE NOT NULL,
    sprite TEXT NOT NULL
);

CREATE TABLE types (
    id   INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT UNIQUE NOT NULL
);

CREATE TABLE pokemon_types (
    pokemon_id INTEGER NOT NULL REFERENCES pokemon(id) ON DELETE CASCADE,
    type_id    INTEGER NOT NULL REFERENCES types(id) ON DELETE CASCADE,
    PRIMARY KEY (pokemon_id, type_id)
);

CREATE INDEX idx_pokemon_types_type ON pokemon_types(type_id);
"#;

/// Ordered list of (version, sql) pairs.
const MIGRATIONS: &[(i64, &str)] = &[(1, V1_INITIAL)];

/// Bring `conn` up to the newest schema version.
///
/// Each pending migration runs in its own transaction together with its
/// `schema_migrations` row.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
    )
    .map_err(|e| Error::database(format!("Failed to create schema_migrations: {e}")))?;

    let applied = current_version(conn)?;
    for &(version, sql) in MIGRATIONS.iter().filter(|(v, _)| *v > applied) {
        apply(conn, version, sql)
            .map_err(|e| Error::database(format!("Migration V{version} failed: {e}")))?;
        tracing::debug!("Applied migration V{version}");
    }

    Ok(())
}

fn apply(conn: &Connection, version: i64, sql: &str) -> rusqlite::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(sql)?;
    tx.execute(
        "INSERT INTO schema_migrations (version) VALUES (?1)",
        [version],
    )?;
    tx.commit()
}

/// Highest applied schema version, or 0 on a fresh database.
pub fn current_version(conn: &Connection) -> Result<i64> {
    conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )
    .map_err(|e| Error::database(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rerun_is_noop() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        // second call is a no-op
        run_migrations(&conn).unwrap();
        assert_eq!(current_version(&conn).unwrap(), 1);
    }

    #[test]
    fn creates_all_tables() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();

        for table in ["pokemon", "types", "pokemon_types", "schema_migrations"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
    }

    #[test]
    fn names_are_unique() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        conn.execute(
            "INSERT INTO pokemon (id, name, sprite) VALUES (25, 'Pikachu', 'a')",
            [],
        )
        .unwrap();
        let dup = conn.execute(
            "INSERT INTO pokemon (id, name, sprite) VALUES (26, 'Pikachu', 'b')",
            [],
        );
        assert!(dup.is_err());

        conn.execute("INSERT INTO types (name) VALUES ('electric')", [])
            .unwrap();
        assert!(conn
            .execute("INSERT INTO types (name) VALUES ('electric')", [])
            .is_err());
    }

    #[test]
    fn memberships_cascade_on_delete() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();

        conn.execute_batch(
            "INSERT INTO pokemon (id, name, sprite) VALUES (94, 'Gengar', 's');
             INSERT INTO types (name) VALUES ('ghost');
             INSERT INTO pokemon_types (pokemon_id, type_id) VALUES (94, 1);
             DELETE FROM pokemon WHERE id = 94;",
        )
        .unwrap();

        let links: i64 = conn
            .query_row("SELECT COUNT(*) FROM pokemon_types", [], |row| row.get(0))
            .unwrap();
        assert_eq!(links, 0);
    }

    #[test]
    fn fresh_database_is_version_zero() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE schema_migrations (version INTEGER PRIMARY KEY, applied_at TEXT)",
        )
        .unwrap();
        assert_eq!(current_version(&conn).unwrap(), 0);
    }
}
