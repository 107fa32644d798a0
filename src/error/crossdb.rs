use axum::{Json, extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse};
use crossdb_core::{DecodeError, ValidationError};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error as ThisError;
use tracing::error;

use super::resolution::ResolutionError;

#[derive(Debug, ThisError)]
pub enum CrossDbError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    #[error("Record {0} not found")]
    RecordNotFound(i64),

    #[error("Rejected payload: {0}")]
    BadPayload(#[from] JsonRejection),

    /// The local store holds a reference value that does not decode.
    #[error("Record {id} holds a malformed reference: {source}")]
    CorruptRecord {
        id: i64,
        #[source]
        source: DecodeError,
    },

    #[error("Ractor error: {0}")]
    RactorError(String),

    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),
}

impl IntoResponse for CrossDbError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            CrossDbError::Validation(err) => {
                let status = StatusCode::BAD_REQUEST;
                let body = ApiErrorObject {
                    code: "VALIDATION_ERROR".to_string(),
                    message: err.message.clone(),
                    details: serde_json::to_value(&err).ok(),
                };
                (status, body)
            }

            CrossDbError::RecordNotFound(id) => {
                let status = StatusCode::NOT_FOUND;
                let body = ApiErrorObject {
                    code: "NOT_FOUND".to_string(),
                    message: format!("Record {id} not found."),
                    details: None,
                };
                (status, body)
            }

            CrossDbError::BadPayload(rejection) => {
                let status = StatusCode::BAD_REQUEST;
                let body = ApiErrorObject {
                    code: "BAD_PAYLOAD".to_string(),
                    message: rejection.body_text(),
                    details: None,
                };
                (status, body)
            }

            CrossDbError::Resolution(err) if err.is_timeout() => {
                let status = StatusCode::GATEWAY_TIMEOUT;
                let body = ApiErrorObject {
                    code: "FOREIGN_STORE_TIMEOUT".to_string(),
                    message: "Foreign store did not answer in time.".to_string(),
                    details: None,
                };
                (status, body)
            }

            CrossDbError::Resolution(_) => {
                let status = StatusCode::BAD_GATEWAY;
                let body = ApiErrorObject {
                    code: "FOREIGN_STORE_ERROR".to_string(),
                    message: "Foreign store lookup failed.".to_string(),
                    details: None,
                };
                (status, body)
            }

            err @ (CrossDbError::DatabaseError(_)
            | CrossDbError::RactorError(_)
            | CrossDbError::CorruptRecord { .. }) => {
                error!(error = %err, "request failed");
                let status = StatusCode::INTERNAL_SERVER_ERROR;
                let body = ApiErrorObject {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                    details: None,
                };
                (status, body)
            }
        };
        (status, Json(ApiErrorBody { inner: error_body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
