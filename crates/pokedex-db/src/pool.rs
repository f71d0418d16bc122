//! r2d2 pool of SQLite connections.
//!
//! Both constructors hand back a pool whose schema is already migrated, so
//! callers can query immediately.

use std::sync::atomic::{AtomicU64, Ordering};

use pokedex_core::{Error, Result};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::migrations;

pub type DbPool = Pool<SqliteConnectionManager>;

pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Default number of pooled connections.
pub const DEFAULT_POOL_SIZE: u32 = 4;

/// PRAGMAs applied to every connection of a file-backed pool.
const FILE_PRAGMAS: &str = "PRAGMA foreign_keys = ON; PRAGMA journal_mode = WAL;";

/// Open (or create) the SQLite file at `db_path` with up to `max_size`
/// connections. A size of zero is raised to one.
pub fn init_pool(db_path: &str, max_size: u32) -> Result<DbPool> {
    let manager =
        SqliteConnectionManager::file(db_path).with_init(|c| c.execute_batch(FILE_PRAGMAS));
    build_migrated(manager, max_size.max(1), "file")
}

/// Fresh in-memory store for tests.
///
/// Every call gets its own named shared-cache database: connections of one
/// pool see the same data, separate pools never do.
pub fn init_memory_pool() -> Result<DbPool> {
    static NEXT_DB: AtomicU64 = AtomicU64::new(0);
    let n = NEXT_DB.fetch_add(1, Ordering::Relaxed);

    let manager =
        SqliteConnectionManager::file(format!("file:pokedex_memdb_{n}?mode=memory&cache=shared"))
            .with_init(|c| c.execute_batch("PRAGMA foreign_keys = ON;"));
    build_migrated(manager, DEFAULT_POOL_SIZE, "in-memory")
}

fn build_migrated(manager: SqliteConnectionManager, size: u32, kind: &str) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(size)
        .build(manager)
        .map_err(|e| Error::database(format!("Failed to create {kind} pool: {e}")))?;

    {
        let conn = get_conn(&pool)?;
        migrations::run_migrations(&conn)?;
    }
    tracing::debug!(kind, size, "Connection pool ready");
    Ok(pool)
}

/// Check a connection out of `pool`.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::database(format!("Failed to get connection from pool: {e}")))
}
