//! Shared application context.
//!
//! [`AppContext`] is handed to every route handler through Axum state. It
//! is cheap to clone: the pool and config sit behind reference counts.

use std::sync::Arc;

use pokedex_core::config::Config;
use pokedex_db::pool::DbPool;

use crate::service::QueryService;

#[derive(Clone)]
pub struct AppContext {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub service: QueryService,
}

impl AppContext {
    pub fn new(db: DbPool, config: Config) -> Self {
        Self {
            service: QueryService::new(db.clone()),
            db,
            config: Arc::new(config),
        }
    }
}
