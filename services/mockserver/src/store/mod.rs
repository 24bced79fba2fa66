//! Entity store for the mock server.
//!
//! # Purpose
//! Holds every entity kind the mock serves behind one reader/writer lock and
//! exposes typed CRUD, the authorization check, and snapshot persistence.
//!
//! # Where it fits
//! The HTTP layer parses and type-checks a request, calls one store
//! operation, and maps the returned [`StoreError`] onto a response status
//! with [`StoreError::status_code`].
use crate::model::input::InputCodecError;
use graymock_authz::AuthzError;
use thiserror::Error;

mod collection;
mod entities;
pub mod memory;
pub mod persistence;

pub use collection::{Collection, Collections, Entity};
pub use memory::{EntityStore, StoreSummary};
pub use persistence::{FilePersistence, NoopPersistence, Persistence};

#[derive(Debug, Error)]
pub enum StoreError {
    /// Missing or empty required key, or malformed entity data.
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    /// Duplicate key, or a delete blocked by live references.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Dangling reference in stored state. Always a defect, never user input.
    #[error("store inconsistency: {0}")]
    Consistency(String),
    #[error("snapshot io: {0}")]
    Io(#[from] std::io::Error),
    #[error("snapshot decode: {0}")]
    Decode(#[from] serde_json::Error),
}

impl StoreError {
    /// HTTP status the API layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            StoreError::Validation(_) => 400,
            StoreError::NotFound(_) => 404,
            StoreError::Conflict(_) => 409,
            StoreError::Consistency(_) | StoreError::Io(_) | StoreError::Decode(_) => 500,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Validation(_) => "validation_failed",
            StoreError::NotFound(_) => "not_found",
            StoreError::Conflict(_) => "conflict",
            StoreError::Consistency(_) => "store_inconsistent",
            StoreError::Io(_) => "snapshot_io",
            StoreError::Decode(_) => "snapshot_decode",
        }
    }
}

impl From<AuthzError> for StoreError {
    fn from(err: AuthzError) -> Self {
        StoreError::Consistency(err.to_string())
    }
}

impl From<InputCodecError> for StoreError {
    fn from(err: InputCodecError) -> Self {
        match err {
            InputCodecError::Encode(source) => StoreError::Decode(source),
            other => StoreError::Validation(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        let cases = [
            (StoreError::Validation("x".into()), 400, "validation_failed"),
            (StoreError::NotFound("x".into()), 404, "not_found"),
            (StoreError::Conflict("x".into()), 409, "conflict"),
            (StoreError::Consistency("x".into()), 500, "store_inconsistent"),
            (
                StoreError::Io(std::io::Error::other("disk full")),
                500,
                "snapshot_io",
            ),
        ];
        for (err, status, code) in cases {
            assert_eq!(err.status_code(), status);
            assert_eq!(err.code(), code);
            assert!(!err.to_string().is_empty());
        }
    }

    #[test]
    fn dangling_role_maps_to_consistency() {
        let err: StoreError = AuthzError::MissingRole("Ghost".into()).into();
        assert!(matches!(err, StoreError::Consistency(ref msg) if msg.contains("Ghost")));
    }

    #[test]
    fn codec_errors_map_to_validation() {
        let err: StoreError = InputCodecError::NotAnObject.into();
        assert_eq!(err.status_code(), 400);
    }
}
