mod common;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode};
use crossdb::config::StoreConfig;
use crossdb::db;
use crossdb::entities::UserProxy;
use crossdb::field::{CrossDatabaseField, FieldOptions};
use crossdb::foreign::{ForeignStore, Target};
use crossdb::server::router::{CrossDbState, crossdb_router};
use crossdb_core::{Reference, UuidStorage};
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;

const ADMIN_KEY: &str = "test-admin-key";
const HEX: &str = "0123456789abcdef0123456789abcdef";
const HYPHENATED: &str = "01234567-89ab-cdef-0123-456789abcdef";

struct TestApp {
    router: Router,
    users: ForeignStore,
    local_url: String,
    paths: Vec<PathBuf>,
}

impl TestApp {
    async fn new(prefix: &str, rows: &[UserProxy]) -> Self {
        let (local_path, local_url) = common::temp_db(&format!("{prefix}-local"));
        let db = db::spawn(&StoreConfig::new(local_url.clone(), UuidStorage::Hex)).await;

        let (users, users_path) =
            common::users_store(&format!("{prefix}-users"), UuidStorage::Native, rows).await;
        let target = Target::new(users.clone()).await.unwrap();
        let field = CrossDatabaseField::new("user_proxy", target, FieldOptions::default());

        let state = CrossDbState::new(db, field, Arc::from(ADMIN_KEY));
        Self {
            router: crossdb_router(state),
            users,
            local_url,
            paths: vec![local_path, users_path],
        }
    }

    async fn call(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        match body {
            Some(json) => self.call_raw(method, uri, &json.to_string()).await,
            None => {
                let req = Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("x-api-key", ADMIN_KEY)
                    .body(Body::empty())
                    .unwrap();
                self.send(req).await
            }
        }
    }

    /// Sends `body` verbatim as a JSON request body.
    async fn call_raw(&self, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("x-api-key", ADMIN_KEY)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn cleanup(&self) {
        for path in &self.paths {
            common::remove_db(path);
        }
    }
}

#[tokio::test]
async fn records_require_admin_key() {
    let app = TestApp::new("auth", &[]).await;

    let resp = app
        .router
        .clone()
        .oneshot(Request::get("/records").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .router
        .clone()
        .oneshot(
            Request::get("/records")
                .header("authorization", "Bearer wrong-key")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .router
        .clone()
        .oneshot(
            Request::get("/records")
                .header("authorization", format!("Bearer {ADMIN_KEY}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    app.cleanup();
}

#[tokio::test]
async fn create_then_read_resolves_the_foreign_row() {
    let reference: Reference = HEX.parse().unwrap();
    let alice = common::user(reference, 7, "alice");
    let app = TestApp::new("resolve", &[alice]).await;

    let (status, created) = app
        .call(
            Method::POST,
            "/records",
            Some(json!({ "label": "invoice", "user_proxy": HEX })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["label"], "invoice");
    assert_eq!(created["user_proxy"], HYPHENATED);
    let id = created["id"].as_i64().unwrap();

    let (status, detail) = app.call(Method::GET, &format!("/records/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["user_proxy"], HYPHENATED);
    assert_eq!(
        detail["resolved"],
        json!({ "id": HYPHENATED, "user_id": 7, "username": "alice" })
    );

    let (status, list) = app.call(Method::GET, "/records", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
    assert!(list[0].get("resolved").is_none());

    app.users.close().await;
    app.cleanup();
}

#[tokio::test]
async fn dangling_reference_reads_as_null() {
    let app = TestApp::new("dangling", &[]).await;

    let (status, created) = app
        .call(
            Method::POST,
            "/records",
            Some(json!({ "label": "orphan", "user_proxy": 42 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        created["user_proxy"],
        "00000000-0000-0000-0000-00000000002a"
    );

    let id = created["id"].as_i64().unwrap();
    let (status, detail) = app.call(Method::GET, &format!("/records/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["resolved"], Value::Null);

    app.users.close().await;
    app.cleanup();
}

#[tokio::test]
async fn invalid_reference_is_a_validation_error() {
    let app = TestApp::new("invalid", &[]).await;

    let (status, body) = app
        .call(
            Method::POST,
            "/records",
            Some(json!({ "label": "bad", "user_proxy": "not-a-uuid" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert_eq!(body["error"]["message"], "\"not-a-uuid\" is not a valid UUID.");
    assert_eq!(body["error"]["details"]["kind"], "invalid");
    assert_eq!(body["error"]["details"]["value"], "not-a-uuid");

    let (_, list) = app.call(Method::GET, "/records", None).await;
    assert_eq!(list, json!([]));

    app.users.close().await;
    app.cleanup();
}

#[tokio::test]
async fn unreachable_foreign_store_is_a_gateway_error() {
    let alice = common::user(HEX.parse().unwrap(), 7, "alice");
    let app = TestApp::new("unreachable", &[alice]).await;

    let (_, with_ref) = app
        .call(
            Method::POST,
            "/records",
            Some(json!({ "label": "linked", "user_proxy": HYPHENATED })),
        )
        .await;
    let (_, without_ref) = app
        .call(Method::POST, "/records", Some(json!({ "label": "plain" })))
        .await;
    app.users.close().await;

    let id = with_ref["id"].as_i64().unwrap();
    let (status, body) = app.call(Method::GET, &format!("/records/{id}"), None).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "FOREIGN_STORE_ERROR");

    // No reference, no lookup.
    let id = without_ref["id"].as_i64().unwrap();
    let (status, body) = app.call(Method::GET, &format!("/records/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_proxy"], Value::Null);
    assert_eq!(body["resolved"], Value::Null);

    app.cleanup();
}

#[tokio::test]
async fn patch_and_delete_records() {
    let app = TestApp::new("patch", &[]).await;

    let (_, created) = app
        .call(
            Method::POST,
            "/records",
            Some(json!({ "label": "draft", "user_proxy": HEX })),
        )
        .await;
    let id = created["id"].as_i64().unwrap();
    let uri = format!("/records/{id}");

    let (status, patched) = app
        .call(Method::PATCH, &uri, Some(json!({ "label": "final" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["label"], "final");
    assert_eq!(patched["user_proxy"], HYPHENATED);

    let (status, body) = app
        .call(Method::PATCH, &uri, Some(json!({ "user_proxy": "xyz" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let (status, cleared) = app
        .call(Method::PATCH, &uri, Some(json!({ "user_proxy": null })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["label"], "final");
    assert_eq!(cleared["user_proxy"], Value::Null);

    let (status, _) = app.call(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app.call(Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, _) = app.call(Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(Method::PATCH, &uri, Some(json!({ "label": "ghost" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.users.close().await;
    app.cleanup();
}

#[tokio::test]
async fn schema_describes_the_reference_field() {
    let app = TestApp::new("schema", &[]).await;

    let (status, schema) = app.call(Method::GET, "/records/schema", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        schema,
        json!({
            "field": {
                "name": "user_proxy",
                "entity": "users.UserProxy",
                "table": "user_proxy",
                "store": "users",
                "nullable": true,
            },
            "form": {
                "name": "user_proxy",
                "label": "User proxy",
                "required": false,
                "initial": "",
            },
        })
    );

    app.users.close().await;
    app.cleanup();
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = TestApp::new("fallback", &[]).await;
    let (status, _) = app.call(Method::GET, "/nowhere", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    app.users.close().await;
    app.cleanup();
}

#[tokio::test]
async fn malformed_body_is_a_bad_payload() {
    let app = TestApp::new("payload", &[]).await;

    // Missing `label`.
    let (status, body) = app
        .call(Method::POST, "/records", Some(json!({ "user_proxy": 1 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_PAYLOAD");
    assert!(body["error"]["message"].as_str().unwrap().contains("label"));

    let (status, body) = app.call_raw(Method::POST, "/records", "{\"label\":").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_PAYLOAD");

    let (_, created) = app
        .call(Method::POST, "/records", Some(json!({ "label": "ok" })))
        .await;
    let id = created["id"].as_i64().unwrap();
    let (status, body) = app
        .call_raw(Method::PATCH, &format!("/records/{id}"), "[1, 2]")
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_PAYLOAD");

    app.users.close().await;
    app.cleanup();
}

#[tokio::test]
async fn integers_beyond_u64_are_accepted() {
    let app = TestApp::new("bigint", &[]).await;

    let (status, created) = app
        .call_raw(
            Method::POST,
            "/records",
            r#"{"label":"big","user_proxy":18446744073709551616}"#,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["user_proxy"], "00000000-0000-0001-0000-000000000000");

    let (status, body) = app
        .call_raw(
            Method::POST,
            "/records",
            r#"{"label":"huge","user_proxy":340282366920938463463374607431768211456}"#,
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    app.users.close().await;
    app.cleanup();
}

#[tokio::test]
async fn corrupt_local_reference_is_an_internal_error() {
    let app = TestApp::new("corrupt", &[]).await;

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(&app.local_url)
        .await
        .unwrap();
    let now = chrono::Utc::now().to_rfc3339();
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO local_records (label, reference, created_at, updated_at) VALUES ('bad', ?, ?, ?) RETURNING id",
    )
    .bind("zz".repeat(16))
    .bind(&now)
    .bind(&now)
    .fetch_one(&pool)
    .await
    .unwrap();
    pool.close().await;

    let (status, body) = app.call(Method::GET, &format!("/records/{id}"), None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "INTERNAL_ERROR");

    app.users.close().await;
    app.cleanup();
}
