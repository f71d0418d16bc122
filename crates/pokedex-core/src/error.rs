//! Unified error type for the Pokédex service.
//!
//! All crates funnel their failures into [`Error`], which carries enough context
//! for the transport layer to derive an HTTP status code via [`Error::http_status`].

use std::fmt;

/// Unified error type covering every failure mode of the service.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A single-entity lookup found nothing under the given name.
    #[error("{entity} with name {name} not found")]
    NotFound {
        /// The kind of entity (e.g. "Pokemon").
        entity: String,
        /// The exact name that was looked up.
        name: String,
    },

    /// Request data failed validation before reaching the store.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A database operation failed.
    #[error("Database error: {source}")]
    Database {
        /// The underlying database error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O operation failed.
    #[error("IO error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Catch-all for unexpected internal errors.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Map this error to an appropriate HTTP status code.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::Validation(_) => 400,
            Error::Database { .. } => 500,
            Error::Io { .. } => 500,
            Error::Internal(_) => 500,
        }
    }

    /// Stable snake_case tag for the variant, used in JSON error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::NotFound { .. } => "not_found",
            Error::Validation(_) => "validation_error",
            Error::Database { .. } => "database_error",
            Error::Io { .. } => "io_error",
            Error::Internal(_) => "internal_error",
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, name: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            name: name.to_string(),
        }
    }

    /// Convenience constructor for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Error::Validation(message.into())
    }

    /// Convenience constructor for [`Error::Database`].
    pub fn database(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Error::Database {
            source: source.into(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        let err = Error::not_found("Pokemon", "Missingno");
        assert_eq!(err.to_string(), "Pokemon with name Missingno not found");
        assert_eq!(err.http_status(), 404);
    }

    #[test]
    fn not_found_keeps_name_verbatim() {
        let err = Error::not_found("Pokemon", " pikachu ");
        assert_eq!(err.to_string(), "Pokemon with name  pikachu  not found");
    }

    #[test]
    fn validation_display() {
        let err = Error::validation("expected string");
        assert_eq!(err.to_string(), "Validation error: expected string");
        assert_eq!(err.http_status(), 400);
    }

    #[test]
    fn database_display() {
        let err = Error::database("disk I/O error");
        assert!(err.to_string().contains("disk I/O error"));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn io_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io { .. }));
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn internal_display() {
        let err = Error::Internal("unexpected state".into());
        assert_eq!(err.to_string(), "Internal error: unexpected state");
        assert_eq!(err.http_status(), 500);
    }

    #[test]
    fn kind_tags() {
        assert_eq!(Error::not_found("Pokemon", "x").kind(), "not_found");
        assert_eq!(Error::validation("x").kind(), "validation_error");
        assert_eq!(Error::database("x").kind(), "database_error");
    }
}
