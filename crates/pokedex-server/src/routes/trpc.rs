//! Procedure route handlers.
//!
//! `GET /api/trpc/{path}?input=<json>` runs one query procedure;
//! `GET /api/trpc/{a},{b}?batch=1&input={"0":..,"1":..}` runs several and
//! answers with an array of envelopes in path order.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::context::AppContext;
use crate::procedures::{self, TrpcCode, TrpcEnvelope, TrpcError};

/// Query string of a procedure request.
#[derive(Debug, Default, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrpcQuery {
    /// `1` or `true` to treat the path as a comma-separated batch.
    pub batch: Option<String>,
    /// URL-encoded JSON input; for batches an object keyed by call index.
    pub input: Option<String>,
}

impl TrpcQuery {
    fn is_batch(&self) -> bool {
        matches!(self.batch.as_deref(), Some("1") | Some("true"))
    }
}

/// Most calls one batched request may carry.
pub const MAX_BATCH_CALLS: usize = 64;

fn respond<T: serde::Serialize>(status: u16, body: T) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body)).into_response()
}

/// GET /api/trpc/{path}
#[utoipa::path(
    get,
    path = "/api/trpc/{path}",
    params(
        ("path" = String, Path, description = "Procedure path, e.g. pokemon.getPokemonByName; comma-separated when batching"),
        TrpcQuery
    ),
    responses(
        (status = 200, description = "Procedure result", body = TrpcEnvelope),
        (status = 207, description = "Batch with mixed outcomes", body = Vec<TrpcEnvelope>),
        (status = 400, description = "Input failed validation", body = TrpcEnvelope),
        (status = 404, description = "Unknown procedure or Pokémon not found", body = TrpcEnvelope)
    )
)]
pub async fn query_procedure(
    State(ctx): State<AppContext>,
    Path(path): Path<String>,
    Query(query): Query<TrpcQuery>,
) -> Response {
    if query.is_batch() {
        return batch(&ctx, &path, query.input.as_deref());
    }

    let envelope = match procedures::parse_raw_input(query.input.as_deref()) {
        Ok(input) => procedures::invoke(&ctx.service, &path, input.as_ref()),
        Err(e) => TrpcError::from_error(&e, Some(&path)).into(),
    };
    respond(envelope.http_status(), envelope)
}

fn batch(ctx: &AppContext, path: &str, raw_input: Option<&str>) -> Response {
    let calls: Vec<&str> = path.split(',').collect();
    if calls.len() > MAX_BATCH_CALLS {
        let err = TrpcError::new(
            TrpcCode::BadRequest,
            format!(
                "batch of {} calls exceeds the limit of {MAX_BATCH_CALLS}",
                calls.len()
            ),
            None,
        );
        return respond(err.http_status(), TrpcEnvelope::from(err));
    }

    let inputs = match procedures::parse_raw_input(raw_input) {
        Ok(None) => None,
        Ok(Some(Value::Object(map))) => Some(map),
        Ok(Some(_)) => {
            let err = TrpcError::new(
                TrpcCode::BadRequest,
                "batch input must be an object keyed by call index",
                None,
            );
            return respond(err.http_status(), TrpcEnvelope::from(err));
        }
        Err(e) => {
            let err = TrpcError::from_error(&e, None);
            return respond(err.http_status(), TrpcEnvelope::from(err));
        }
    };

    let envelopes: Vec<TrpcEnvelope> = calls
        .into_iter()
        .enumerate()
        .map(|(i, call_path)| {
            let input = inputs.as_ref().and_then(|m| m.get(&i.to_string()));
            procedures::invoke(&ctx.service, call_path, input)
        })
        .collect();

    let mut statuses = envelopes.iter().map(TrpcEnvelope::http_status);
    let first = statuses.next().unwrap_or(200);
    let status = if statuses.all(|s| s == first) {
        first
    } else {
        207
    };

    tracing::debug!(calls = envelopes.len(), status, "Batch handled");
    respond(status, envelopes)
}

/// POST /api/trpc/{path}
///
/// Every procedure is a query, so mutation-style calls are refused.
pub async fn mutation_not_supported(Path(path): Path<String>) -> Response {
    let err = TrpcError::new(
        TrpcCode::MethodNotSupported,
        format!("Unsupported POST-request to query procedure at path \"{path}\""),
        Some(&path),
    );
    respond(err.http_status(), TrpcEnvelope::from(err))
}
