//! Shared test harness for integration tests.
//!
//! Provides [`TestHarness`] which creates a seeded in-memory DB, default
//! config and full [`AppContext`]. The [`TestHarness::with_server`]
//! constructor starts the server on a random port for HTTP-level testing.

#![allow(dead_code)]

use std::net::SocketAddr;

use pokedex_core::config::Config;
use pokedex_db::pool::{init_memory_pool, DbPool};
use pokedex_server::context::AppContext;
use tokio_util::sync::CancellationToken;

/// Test harness wrapping a fully-constructed [`AppContext`] backed by an
/// in-memory database holding the built-in seed set.
pub struct TestHarness {
    pub ctx: AppContext,
    pub db: DbPool,
    pub cancel: CancellationToken,
}

impl TestHarness {
    /// Create a new harness with default configuration and a seeded DB.
    pub fn new() -> Self {
        let db = init_memory_pool().expect("failed to create in-memory pool");
        pokedex_db::seed::seed_builtin(&db.get().expect("failed to get db connection"))
            .expect("failed to seed");
        Self::with_pool(db)
    }

    /// Create a harness over an empty store.
    pub fn empty() -> Self {
        Self::with_pool(init_memory_pool().expect("failed to create in-memory pool"))
    }

    fn with_pool(db: DbPool) -> Self {
        let ctx = AppContext::new(db.clone(), Config::default());
        Self {
            ctx,
            db,
            cancel: CancellationToken::new(),
        }
    }

    /// Start the server on a random port and return the harness together
    /// with the bound socket address.
    pub async fn with_server() -> (Self, SocketAddr) {
        Self::new().serve().await
    }

    /// Start the server over an empty store.
    pub async fn with_empty_server() -> (Self, SocketAddr) {
        Self::empty().serve().await
    }

    async fn serve(self) -> (Self, SocketAddr) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(pokedex_server::serve(
            self.ctx.clone(),
            listener,
            self.cancel.clone(),
        ));

        (self, addr)
    }

    /// Get a database connection from the pool.
    pub fn conn(&self) -> pokedex_db::pool::PooledConnection {
        pokedex_db::pool::get_conn(&self.db).expect("failed to get db connection")
    }
}

impl Drop for TestHarness {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// URL of a single procedure call; `input` is JSON and gets URL-encoded.
pub fn procedure_url(addr: SocketAddr, path: &str, input: Option<&str>) -> reqwest::Url {
    let base = format!("http://{addr}/api/trpc/{path}");
    let params: Vec<(&str, &str)> = input.map(|json| ("input", json)).into_iter().collect();
    reqwest::Url::parse_with_params(&base, &params).unwrap()
}

/// URL of a batched call over `paths`; `input` is the batch input object.
pub fn batch_url(addr: SocketAddr, paths: &[&str], input: &str) -> reqwest::Url {
    let base = format!("http://{addr}/api/trpc/{}", paths.join(","));
    reqwest::Url::parse_with_params(&base, &[("batch", "1"), ("input", input)]).unwrap()
}

/// GET a procedure and return status plus parsed body.
pub async fn call(
    addr: SocketAddr,
    path: &str,
    input: Option<&str>,
) -> (u16, serde_json::Value) {
    let resp = reqwest::get(procedure_url(addr, path, input)).await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}
