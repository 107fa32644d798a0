use crate::error::{ApiErrorBody, ApiErrorObject};
use crate::server::router::CrossDbState;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{HeaderMap, StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use subtle::ConstantTimeEq;
use tracing::warn;

const X_API_KEY: &str = "x-api-key";

/// Admin key presented by the caller: `x-api-key` wins over a bearer token.
fn presented_admin_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(X_API_KEY)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .or_else(|| {
            headers
                .typed_get::<Authorization<Bearer>>()
                .map(|bearer| bearer.token().to_string())
        })
}

/// Extractor guarding the record admin API with `basic.admin_key`.
#[derive(Debug, Clone, Copy)]
pub struct RequireAdminKey;

impl FromRequestParts<CrossDbState> for RequireAdminKey {
    type Rejection = AdminKeyRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &CrossDbState,
    ) -> Result<Self, Self::Rejection> {
        let Some(presented) = presented_admin_key(&parts.headers) else {
            return Err(AdminKeyRejection::Missing);
        };

        let matches: bool = presented
            .as_bytes()
            .ct_eq(state.admin_key.as_bytes())
            .into();
        if matches {
            Ok(RequireAdminKey)
        } else {
            warn!(path = parts.uri.path(), "admin key mismatch");
            Err(AdminKeyRejection::Mismatch)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminKeyRejection {
    Missing,
    Mismatch,
}

impl IntoResponse for AdminKeyRejection {
    fn into_response(self) -> Response {
        let message = match self {
            AdminKeyRejection::Missing => "Missing admin key.",
            AdminKeyRejection::Mismatch => "Invalid admin key.",
        };
        let body = ApiErrorBody {
            inner: ApiErrorObject {
                code: "UNAUTHORIZED".to_string(),
                message: message.to_string(),
                details: None,
            },
        };
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}
