use serde::Serialize;
use std::fmt::Display;
use thiserror::Error as ThisError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// The value cannot be read as a UUID.
    Invalid,
    /// A non-nullable field was given no value.
    Null,
}

impl ValidationErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ValidationErrorKind::Invalid => "invalid",
            ValidationErrorKind::Null => "null",
        }
    }
}

/// Raised when a raw value cannot become a `Reference`.
///
/// Serializes as `{ "kind": "invalid", "value": "...", "message": "..." }`, which is
/// also the body the admin API returns for rejected input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ThisError)]
#[error("{message}")]
pub struct ValidationError {
    pub kind: ValidationErrorKind,
    pub value: String,
    pub message: String,
}

impl ValidationError {
    pub fn invalid(value: impl Display) -> Self {
        let value = value.to_string();
        let message = format!("\"{value}\" is not a valid UUID.");
        Self {
            kind: ValidationErrorKind::Invalid,
            value,
            message,
        }
    }

    pub fn null() -> Self {
        Self {
            kind: ValidationErrorKind::Null,
            value: "null".to_string(),
            message: "This field cannot be null.".to_string(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

/// A stored column value that is neither 32 hex characters nor a 16-byte UUID.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum DecodeError {
    #[error("stored UUID text must be 32 hex characters, got {value:?}")]
    MalformedHex { value: String },

    #[error("stored native UUID must be 16 bytes, got {0}")]
    WrongWidth(usize),
}
