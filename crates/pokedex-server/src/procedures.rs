//! Procedure binding: names, input validation and the tRPC wire envelopes.
//!
//! A call is resolved in three steps: the path is matched to a
//! [`Procedure`], its raw JSON input is validated into a [`ProcedureCall`],
//! and the call is run against the [`QueryService`]. Only validated calls
//! reach the service.

use std::fmt;
use std::str::FromStr;

use pokedex_core::{Error, Result};
use serde::Serialize;
use serde_json::Value;

use crate::service::QueryService;

// ---------------------------------------------------------------------------
// Procedure names
// ---------------------------------------------------------------------------

/// The query procedures exposed under `/api/trpc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Procedure {
    GetPokemonByName,
    GetPokemonByNames,
    GetPokemonByType,
    GetAllTypes,
}

impl Procedure {
    pub const ALL: [Procedure; 4] = [
        Procedure::GetPokemonByName,
        Procedure::GetPokemonByNames,
        Procedure::GetPokemonByType,
        Procedure::GetAllTypes,
    ];

    /// Wire path of the procedure.
    pub fn path(self) -> &'static str {
        match self {
            Procedure::GetPokemonByName => "pokemon.getPokemonByName",
            Procedure::GetPokemonByNames => "pokemon.getPokemonByNames",
            Procedure::GetPokemonByType => "pokemon.getPokemonByType",
            Procedure::GetAllTypes => "pokemon.getAllTypes",
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for Procedure {
    type Err = TrpcError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Procedure::ALL
            .into_iter()
            .find(|p| p.path() == s)
            .ok_or_else(|| TrpcError::unknown_procedure(s))
    }
}

// ---------------------------------------------------------------------------
// Input validation
// ---------------------------------------------------------------------------

/// A procedure together with its validated input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcedureCall {
    ByName(String),
    ByNames(Vec<String>),
    ByType(Option<String>),
    AllTypes,
}

/// Name of a JSON value's kind as reported in validation messages.
fn kind(value: Option<&Value>) -> &'static str {
    match value {
        None => "undefined",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    }
}

fn expected(what: &str, at: &str, got: Option<&Value>) -> Error {
    Error::validation(format!("{at}: expected {what}, received {}", kind(got)))
}

impl ProcedureCall {
    /// Validate `input` against the shape `procedure` accepts.
    ///
    /// `None` means the request carried no input at all.
    pub fn parse(procedure: Procedure, input: Option<&Value>) -> Result<Self> {
        match procedure {
            Procedure::GetPokemonByName => match input {
                Some(Value::String(name)) => Ok(ProcedureCall::ByName(name.clone())),
                other => Err(expected("string", "input", other)),
            },
            Procedure::GetPokemonByNames => match input {
                Some(Value::Array(items)) => items
                    .iter()
                    .enumerate()
                    .map(|(i, item)| match item {
                        Value::String(name) => Ok(name.clone()),
                        other => Err(expected("string", &format!("input[{i}]"), Some(other))),
                    })
                    .collect::<Result<Vec<_>>>()
                    .map(ProcedureCall::ByNames),
                other => Err(expected("array", "input", other)),
            },
            Procedure::GetPokemonByType => match input {
                None | Some(Value::Null) => Ok(ProcedureCall::ByType(None)),
                Some(Value::String(name)) => Ok(ProcedureCall::ByType(Some(name.clone()))),
                other => Err(expected("string", "input", other)),
            },
            Procedure::GetAllTypes => Ok(ProcedureCall::AllTypes),
        }
    }

    /// Run the call and serialize its output.
    pub fn execute(&self, service: &QueryService) -> Result<Value> {
        let output = match self {
            ProcedureCall::ByName(name) => serde_json::to_value(service.lookup_by_name(name)?),
            ProcedureCall::ByNames(names) => serde_json::to_value(service.lookup_by_names(names)?),
            ProcedureCall::ByType(type_name) => {
                serde_json::to_value(service.list_by_type(type_name.as_deref())?)
            }
            ProcedureCall::AllTypes => serde_json::to_value(service.list_types()?),
        };
        output.map_err(|e| Error::Internal(format!("failed to serialize output: {e}")))
    }
}

/// Parse the raw `input` query parameter as JSON.
pub fn parse_raw_input(raw: Option<&str>) -> Result<Option<Value>> {
    raw.map(|s| {
        serde_json::from_str(s)
            .map_err(|e| Error::validation(format!("input is not valid JSON: {e}")))
    })
    .transpose()
}

// ---------------------------------------------------------------------------
// Wire envelopes
// ---------------------------------------------------------------------------

/// tRPC error codes this surface can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrpcCode {
    BadRequest,
    NotFound,
    MethodNotSupported,
    InternalServerError,
}

impl TrpcCode {
    pub fn as_str(self) -> &'static str {
        match self {
            TrpcCode::BadRequest => "BAD_REQUEST",
            TrpcCode::NotFound => "NOT_FOUND",
            TrpcCode::MethodNotSupported => "METHOD_NOT_SUPPORTED",
            TrpcCode::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }

    /// JSON-RPC 2.0 error number.
    pub fn json_rpc(self) -> i32 {
        match self {
            TrpcCode::BadRequest => -32600,
            TrpcCode::NotFound => -32004,
            TrpcCode::MethodNotSupported => -32005,
            TrpcCode::InternalServerError => -32603,
        }
    }

    pub fn http_status(self) -> u16 {
        match self {
            TrpcCode::BadRequest => 400,
            TrpcCode::NotFound => 404,
            TrpcCode::MethodNotSupported => 405,
            TrpcCode::InternalServerError => 500,
        }
    }

    fn from_error(err: &Error) -> Self {
        match err {
            Error::Validation(_) => TrpcCode::BadRequest,
            Error::NotFound { .. } => TrpcCode::NotFound,
            _ => TrpcCode::InternalServerError,
        }
    }
}

/// Structured part of an error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TrpcErrorData {
    #[schema(example = "NOT_FOUND")]
    pub code: String,
    #[schema(example = 404)]
    pub http_status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Error body of a failed procedure call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct TrpcError {
    #[schema(example = "Pokemon with name Missingno not found")]
    pub message: String,
    /// JSON-RPC 2.0 error number.
    pub code: i32,
    pub data: TrpcErrorData,
}

impl TrpcError {
    pub fn new(code: TrpcCode, message: impl Into<String>, path: Option<&str>) -> Self {
        Self {
            message: message.into(),
            code: code.json_rpc(),
            data: TrpcErrorData {
                code: code.as_str().to_string(),
                http_status: code.http_status(),
                path: path.map(str::to_string),
            },
        }
    }

    /// Convert a service error; the message is passed through verbatim.
    ///
    /// Validation errors drop the crate-level prefix so clients see only the
    /// shape complaint.
    pub fn from_error(err: &Error, path: Option<&str>) -> Self {
        let code = TrpcCode::from_error(err);
        if code == TrpcCode::InternalServerError {
            tracing::error!(path = path.unwrap_or("-"), error = %err, "Procedure failed");
        }
        let message = match err {
            Error::Validation(msg) => msg.clone(),
            other => other.to_string(),
        };
        Self::new(code, message, path)
    }

    pub fn unknown_procedure(path: &str) -> Self {
        Self::new(
            TrpcCode::NotFound,
            format!("No \"query\"-procedure on path \"{path}\""),
            Some(path),
        )
    }

    pub fn http_status(&self) -> u16 {
        self.data.http_status
    }
}

/// Success body of a procedure call.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
pub struct TrpcResult {
    #[schema(value_type = Object)]
    pub data: Value,
}

/// One response envelope: either `{"result": ...}` or `{"error": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, utoipa::ToSchema)]
#[serde(untagged)]
pub enum TrpcEnvelope {
    Ok { result: TrpcResult },
    Err { error: TrpcError },
}

impl TrpcEnvelope {
    pub fn http_status(&self) -> u16 {
        match self {
            TrpcEnvelope::Ok { .. } => 200,
            TrpcEnvelope::Err { error } => error.http_status(),
        }
    }
}

impl From<TrpcError> for TrpcEnvelope {
    fn from(error: TrpcError) -> Self {
        TrpcEnvelope::Err { error }
    }
}

/// Resolve, validate and run one call, producing its envelope.
pub fn invoke(service: &QueryService, path: &str, input: Option<&Value>) -> TrpcEnvelope {
    let procedure = match path.parse::<Procedure>() {
        Ok(p) => p,
        Err(e) => return e.into(),
    };

    let outcome = ProcedureCall::parse(procedure, input).and_then(|call| {
        tracing::debug!(procedure = %procedure, ?call, "Invoking procedure");
        call.execute(service)
    });

    match outcome {
        Ok(data) => TrpcEnvelope::Ok {
            result: TrpcResult { data },
        },
        Err(e) => TrpcError::from_error(&e, Some(path)).into(),
    }
}
