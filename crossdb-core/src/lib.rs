pub mod codec;
pub mod display;
pub mod error;
pub mod reference;
#[cfg(feature = "sqlx")]
mod sqlite;

pub use codec::{StorageValue, UuidStorage, decode, encode};
pub use display::{HasPrimaryKey, to_display, to_display_optional};
pub use error::{DecodeError, ValidationError, ValidationErrorKind};
pub use reference::{RawValue, Reference, normalize};
