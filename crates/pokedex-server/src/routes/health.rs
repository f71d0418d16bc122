//! Liveness check.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::context::AppContext;
use crate::error::AppError;

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service and store are reachable", body = HealthResponse),
        (status = 500, description = "Store unavailable")
    )
)]
pub async fn health_check(
    State(ctx): State<AppContext>,
) -> Result<Json<HealthResponse>, AppError> {
    let conn = pokedex_db::pool::get_conn(&ctx.db)?;
    conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
        .map_err(|e| pokedex_core::Error::database(e.to_string()))?;
    Ok(Json(HealthResponse {
        status: "ok".into(),
    }))
}
