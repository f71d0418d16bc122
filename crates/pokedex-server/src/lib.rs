//! pokedex-server: HTTP procedure surface over the Pokédex store.
//!
//! This crate ties the store to a running server application. It provides:
//!
//! - the query service translating store rows into client DTOs
//! - tRPC-style procedure routes with input validation and batching
//! - health check, OpenAPI document and optional static UI serving
//! - graceful shutdown via signal handling

pub mod context;
pub mod error;
pub mod middleware;
pub mod procedures;
pub mod router;
pub mod routes;
pub mod service;

use std::net::SocketAddr;

use pokedex_core::config::Config;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use crate::context::AppContext;

/// Open the store at `config.server.db_path`, creating parent directories,
/// running migrations and seeding when configured.
pub fn open_store(config: &Config) -> pokedex_core::Result<pokedex_db::pool::DbPool> {
    let db_path = &config.server.db_path;
    let existed = db_path.exists();
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
            tracing::info!("Created database directory {}", parent.display());
        }
    }

    let db_str = db_path.to_string_lossy();
    let db = pokedex_db::pool::init_pool(&db_str, config.database.effective_pool_size())?;
    if existed {
        tracing::info!("Database opened (existing) at {db_str}");
    } else {
        tracing::info!("Database created (new) at {db_str}");
    }

    if config.database.seed_on_start {
        let conn = pokedex_db::pool::get_conn(&db)?;
        if let Some(report) = pokedex_db::seed::seed_if_empty(&conn)? {
            tracing::info!(
                "Seeded {} Pokémon across {} types",
                report.pokemon_created,
                report.types_created
            );
        }
    }

    Ok(db)
}

/// Start the Pokédex server.
///
/// Opens the store, builds the [`AppContext`] and serves HTTP until a
/// shutdown signal is received.
pub async fn start(config: Config) -> pokedex_core::Result<()> {
    for warning in config.validate() {
        tracing::warn!("Config warning: {warning}");
    }

    let db = open_store(&config)?;

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| pokedex_core::Error::Internal(format!("Invalid server address: {e}")))?;

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| pokedex_core::Error::Internal(format!("Failed to bind to {addr}: {e}")))?;

    let ctx = AppContext::new(db, config);
    let cancel = CancellationToken::new();
    tokio::spawn(shutdown_signal(cancel.clone()));

    serve(ctx, listener, cancel).await
}

/// Serve the router on an already-bound listener until `cancel` fires.
pub async fn serve(
    ctx: AppContext,
    listener: TcpListener,
    cancel: CancellationToken,
) -> pokedex_core::Result<()> {
    let app = router::build_router(ctx.clone(), ctx.config.server.static_dir.clone());

    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Starting server on {addr}");
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Wait for a shutdown signal (SIGINT or SIGTERM), then cancel `cancel`.
async fn shutdown_signal(cancel: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
        _ = cancel.cancelled() => {}
    }

    tracing::info!("Shutdown signal received");
    cancel.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pokemon_count(db: &pokedex_db::pool::DbPool) -> i64 {
        let conn = db.get().unwrap();
        pokedex_db::queries::pokemon::count_pokemon(&conn).unwrap()
    }

    fn temp_config(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.server.db_path = dir.join("nested").join("pokedex.db");
        config
    }

    #[test]
    fn open_store_creates_and_seeds() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(dir.path());

        let db = open_store(&config).unwrap();
        assert!(config.server.db_path.exists());
        assert_eq!(pokemon_count(&db), 8);
    }

    #[test]
    fn open_store_twice_does_not_duplicate() {
        let dir = tempfile::tempdir().unwrap();
        let config = temp_config(dir.path());

        drop(open_store(&config).unwrap());
        let db = open_store(&config).unwrap();
        assert_eq!(pokemon_count(&db), 8);
    }

    #[test]
    fn open_store_without_seeding() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = temp_config(dir.path());
        config.database.seed_on_start = false;

        let db = open_store(&config).unwrap();
        assert_eq!(pokemon_count(&db), 0);
    }

    #[tokio::test]
    async fn serve_stops_on_cancel() {
        let db = pokedex_db::pool::init_memory_pool().unwrap();
        let ctx = AppContext::new(db, Config::default());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(serve(ctx, listener, cancel.clone()));
        cancel.cancel();
        handle.await.unwrap().unwrap();
    }
}
