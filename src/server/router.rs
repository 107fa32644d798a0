use crate::db::DbActorHandle;
use crate::entities::UserProxy;
use crate::field::CrossDatabaseField;
use crate::server::guards::auth::RequireAdminKey;
use crate::server::routes::records;

use axum::{
    Router,
    extract::Request,
    http::{HeaderName, HeaderValue, Method, StatusCode, Version, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

fn generate_request_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn format_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

#[derive(Clone)]
pub struct CrossDbState {
    pub db: DbActorHandle,
    pub user_proxy: CrossDatabaseField<UserProxy>,
    pub admin_key: Arc<str>,
}

impl CrossDbState {
    pub fn new(
        db: DbActorHandle,
        user_proxy: CrossDatabaseField<UserProxy>,
        admin_key: Arc<str>,
    ) -> Self {
        Self {
            db,
            user_proxy,
            admin_key,
        }
    }
}

async fn not_found_handler() -> StatusCode {
    StatusCode::NOT_FOUND
}

macro_rules! access_event {
    ($level:ident, $entry:ident) => {
        tracing::$level!(
            status = $entry.status,
            request_id = %$entry.request_id,
            method = %$entry.method,
            protocol = $entry.protocol,
            path = %$entry.path,
            latency_ms = $entry.latency_ms,
            user_agent = %$entry.user_agent,
            "request served"
        )
    };
}

struct AccessEntry {
    status: u16,
    request_id: String,
    method: Method,
    protocol: &'static str,
    path: String,
    latency_ms: u64,
    user_agent: String,
}

/// Tags every response with `x-request-id` and logs it, louder for error statuses.
async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let protocol = format_http_version(req.version());
    let headers = req.headers();

    let request_id = headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(generate_request_id, str::to_string);
    let user_agent = headers
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let started = Instant::now();
    let mut resp = next.run(req).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let entry = AccessEntry {
        status: status.as_u16(),
        request_id,
        method,
        protocol,
        path,
        latency_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        user_agent,
    };
    if status.is_server_error() {
        access_event!(error, entry);
    } else if status.is_client_error() {
        access_event!(warn, entry);
    } else {
        access_event!(info, entry);
    }

    resp
}

pub fn crossdb_router(state: CrossDbState) -> Router {
    let records = records::router()
        .layer(middleware::from_extractor_with_state::<RequireAdminKey, _>(
            state.clone(),
        ));

    Router::new()
        .merge(records)
        .fallback(not_found_handler)
        .with_state(state)
        .layer(middleware::from_fn(access_log))
}
