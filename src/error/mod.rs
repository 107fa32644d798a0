mod crossdb;
mod resolution;

pub use crossdb::{ApiErrorBody, ApiErrorObject, CrossDbError};
pub use crossdb_core::{DecodeError, ValidationError, ValidationErrorKind};
pub use resolution::ResolutionError;
