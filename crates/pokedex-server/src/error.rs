//! JSON error responses for the plain HTTP routes (`/health`).
//!
//! Procedure calls never go through here; they answer with a tRPC error
//! envelope built by [`crate::procedures::TrpcError`].

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pokedex_core::Error;
use serde_json::json;

/// Handler error carrying a [`pokedex_core::Error`].
#[derive(Debug)]
pub struct AppError(pub Error);

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let Self(err) = self;
        let status =
            StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            tracing::error!(%status, error = %err, "Request failed");
        }

        let body = Json(json!({ "error": err.to_string(), "code": err.kind() }));
        (status, body).into_response()
    }
}
