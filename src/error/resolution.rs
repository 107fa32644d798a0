use crossdb_core::{DecodeError, UuidStorage};
use std::time::Duration;
use thiserror::Error as ThisError;

/// Failure to reach or read a foreign store.
///
/// A well-formed reference with no matching row is never one of these; it resolves to
/// `Resolved::Absent`.
#[derive(Debug, ThisError)]
pub enum ResolutionError {
    #[error("unknown foreign store alias {0:?}")]
    UnknownStore(String),

    #[error("foreign store {store:?} lookup on {entity} failed: {source}")]
    Store {
        store: String,
        entity: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("foreign store {store:?} is declared {declared:?} but {entity} keys are {found}")]
    StorageMismatch {
        store: String,
        entity: &'static str,
        declared: UuidStorage,
        found: &'static str,
    },

    #[error("malformed stored reference: {0}")]
    MalformedStorage(#[from] DecodeError),

    #[error("foreign store {store:?} lookup on {entity} exceeded {after:?}")]
    Timeout {
        store: String,
        entity: &'static str,
        after: Duration,
    },
}

impl ResolutionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ResolutionError::Timeout { .. })
    }
}
