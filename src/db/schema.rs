//! SQL DDL for initializing the local schema.
//! SQLite-first design; can be adapted for other RDBMS.

use crossdb_core::UuidStorage;

/// SQLite schema includes:
/// - `local_records` table (one reference per row, no foreign-key constraint since the
///   referenced row lives in another database)
///
/// The `reference` column type follows the backend's UUID storage.
pub fn sqlite_init(storage: UuidStorage) -> String {
    format!(
        r#"
-- ---------------------------------------------------------------------------
-- Local records
-- ---------------------------------------------------------------------------
CREATE TABLE IF NOT EXISTS local_records (
    id INTEGER PRIMARY KEY NOT NULL,
    label TEXT NOT NULL,
    reference {column_type} NULL CHECK (reference IS NULL OR length(reference) = {width}),
    created_at TEXT NOT NULL, -- RFC3339
    updated_at TEXT NOT NULL -- RFC3339
);

CREATE INDEX IF NOT EXISTS idx_local_records_reference ON local_records(reference);
"#,
        column_type = storage.column_type(),
        width = storage.stored_width(),
    )
}
