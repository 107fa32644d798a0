//! RecordPatch -> DbPatchable implementation.
//!
//! This sits in the `db` module because it contains SQL/table knowledge.

use async_trait::async_trait;
use chrono::Utc;
use crossdb_core::{UuidStorage, codec};
use sqlx::SqlitePool;
use tracing::debug;

use super::patch::{DbPatchable, RecordPatch};
use crate::error::CrossDbError;

#[async_trait]
impl DbPatchable for RecordPatch {
    async fn apply_patch(&self, pool: &SqlitePool, storage: UuidStorage) -> Result<(), CrossDbError> {
        let RecordPatch {
            id,
            label,
            reference,
        } = self.clone();

        let label_set = label.is_some();
        let reference_set = reference.is_some();
        let stored = codec::encode(reference.flatten(), storage);
        let updated_at = Utc::now();

        let res = sqlx::query(
            r#"
            UPDATE local_records
            SET
                label = COALESCE(?, label),
                reference = CASE WHEN ? THEN ? ELSE reference END,
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(label)
        .bind(reference_set)
        .bind(stored)
        .bind(updated_at)
        .bind(id)
        .execute(pool)
        .await?;

        let affected = res.rows_affected();
        debug!(
            id,
            affected,
            updated_at = %updated_at,
            label_set,
            reference_set,
            "db patch applied"
        );

        if affected == 0 {
            return Err(CrossDbError::RecordNotFound(id));
        }

        Ok(())
    }
}
