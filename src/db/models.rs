use chrono::{DateTime, Utc};
use crossdb_core::StorageValue;
use sqlx::FromRow;

/// A `local_records` row. `reference` is kept in its stored form; the reference field
/// decodes it.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct DbLocalRecord {
    pub id: i64,
    pub label: String,
    pub reference: Option<StorageValue>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
