//! Admin JSON API over local records and their cross-database reference.

use crate::db::{DbLocalRecord, RecordCreate, RecordPatch};
use crate::entities::UserProxy;
use crate::error::CrossDbError;
use crate::field::{FieldDescriptor, FormSpec, TypedField};
use crate::foreign::Resolved;
use crate::server::router::CrossDbState;
use crate::utils::logging::debug_json;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::get,
};
use chrono::{DateTime, Utc};
use crossdb_core::{RawValue, Reference};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub fn router() -> Router<CrossDbState> {
    Router::new()
        .route("/records", get(list_records).post(create_record))
        .route("/records/schema", get(record_schema))
        .route(
            "/records/{id}",
            get(get_record).patch(patch_record).delete(delete_record),
        )
}

#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub label: String,
    /// Any admissible raw form: hex or hyphenated string, integer, or null.
    #[serde(default)]
    pub user_proxy: Value,
}

#[derive(Debug, Deserialize)]
pub struct PatchRecordRequest {
    pub label: Option<String>,
    /// Absent => keep; `null` => clear; anything else is normalized.
    #[serde(default, deserialize_with = "present")]
    pub user_proxy: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

#[derive(Debug, Serialize)]
pub struct RecordView {
    pub id: i64,
    pub label: String,
    /// Display form of the reference; `null` when unset.
    pub user_proxy: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct RecordDetail {
    #[serde(flatten)]
    pub record: RecordView,
    /// The referenced foreign row; `null` when unset or when no row matches.
    pub resolved: Option<UserProxy>,
}

#[derive(Debug, Serialize)]
pub struct RecordSchema {
    pub field: FieldDescriptor,
    pub form: FormSpec,
}

/// A local value that fails to decode is our own corruption, not a foreign store fault.
fn decode_reference(
    state: &CrossDbState,
    row: &DbLocalRecord,
) -> Result<Option<Reference>, CrossDbError> {
    state
        .user_proxy
        .from_storage(row.reference.clone())
        .map_err(|source| CrossDbError::CorruptRecord { id: row.id, source })
}

fn record_view(state: &CrossDbState, row: DbLocalRecord) -> Result<RecordView, CrossDbError> {
    let reference = decode_reference(state, &row)?;
    Ok(RecordView {
        id: row.id,
        label: row.label,
        user_proxy: reference.map(|r| state.user_proxy.to_display(Some(&r))),
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

async fn fetch_row(state: &CrossDbState, id: i64) -> Result<DbLocalRecord, CrossDbError> {
    state
        .db
        .get(id)
        .await?
        .ok_or(CrossDbError::RecordNotFound(id))
}

/// POST /records
pub async fn create_record(
    State(state): State<CrossDbState>,
    payload: Result<Json<CreateRecordRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RecordView>), CrossDbError> {
    let Json(body) = payload?;
    let reference = state.user_proxy.clean(RawValue::from(body.user_proxy))?;
    let id = state
        .db
        .create(RecordCreate {
            label: body.label,
            reference,
        })
        .await?;

    let view = record_view(&state, fetch_row(&state, id).await?)?;
    debug_json("record created", &view);
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /records
pub async fn list_records(
    State(state): State<CrossDbState>,
) -> Result<Json<Vec<RecordView>>, CrossDbError> {
    let rows = state.db.list().await?;
    let views = rows
        .into_iter()
        .map(|row| record_view(&state, row))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(views))
}

/// GET /records/{id}
///
/// Resolves the reference against the foreign store. A dangling reference yields
/// `"resolved": null`; an unreachable store is an error.
pub async fn get_record(
    State(state): State<CrossDbState>,
    Path(id): Path<i64>,
) -> Result<Json<RecordDetail>, CrossDbError> {
    let row = fetch_row(&state, id).await?;
    let reference = decode_reference(&state, &row)?;
    let resolved = state
        .user_proxy
        .resolve_optional(reference)
        .await?
        .and_then(Resolved::into_option);

    Ok(Json(RecordDetail {
        record: record_view(&state, row)?,
        resolved,
    }))
}

/// PATCH /records/{id}
pub async fn patch_record(
    State(state): State<CrossDbState>,
    Path(id): Path<i64>,
    payload: Result<Json<PatchRecordRequest>, JsonRejection>,
) -> Result<Json<RecordView>, CrossDbError> {
    let Json(body) = payload?;
    let reference = body
        .user_proxy
        .map(|raw| state.user_proxy.clean(RawValue::from(raw)))
        .transpose()?;

    state
        .db
        .patch(RecordPatch {
            id,
            label: body.label,
            reference,
        })
        .await?;

    let view = record_view(&state, fetch_row(&state, id).await?)?;
    Ok(Json(view))
}

/// DELETE /records/{id}
pub async fn delete_record(
    State(state): State<CrossDbState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, CrossDbError> {
    if state.db.delete(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(CrossDbError::RecordNotFound(id))
    }
}

/// GET /records/schema
pub async fn record_schema(State(state): State<CrossDbState>) -> Json<RecordSchema> {
    Json(RecordSchema {
        field: state.user_proxy.descriptor(),
        form: state.user_proxy.form_spec(None),
    })
}
