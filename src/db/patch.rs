use async_trait::async_trait;
use crossdb_core::{Reference, UuidStorage};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Abstraction for applying a patch payload to the local database.
#[async_trait]
pub trait DbPatchable {
    async fn apply_patch(
        &self,
        pool: &SqlitePool,
        storage: UuidStorage,
    ) -> Result<(), crate::error::CrossDbError>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordCreate {
    pub label: String,
    pub reference: Option<Reference>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPatch {
    pub id: i64,
    /// `None` => do not change; `Some(v)` => update
    pub label: Option<String>,
    /// `None` => do not change; `Some(None)` => clear; `Some(Some(r))` => point at `r`
    pub reference: Option<Option<Reference>>,
}
