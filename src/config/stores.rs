use crossdb_core::UuidStorage;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Connection settings for one SQLite database (the local store or a foreign one).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// SQLite URL, e.g. `sqlite://users.db`.
    pub database_url: String,

    /// How this backend persists UUID columns: `native` (16-byte BLOB) or `hex` (32-char TEXT).
    /// Default: `hex`.
    #[serde(default)]
    pub uuid_storage: UuidStorage,

    /// Pool size for the connection.
    /// Default: `5`.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

impl StoreConfig {
    pub fn new(database_url: impl Into<String>, uuid_storage: UuidStorage) -> Self {
        Self {
            database_url: database_url.into(),
            uuid_storage,
            max_connections: default_max_connections(),
        }
    }
}

/// The local store holding records and their references.
/// TOML: `[local]`. Default: `sqlite://local.db`, hex storage.
pub(super) fn default_local() -> StoreConfig {
    StoreConfig::new("sqlite://local.db", UuidStorage::Hex)
}

/// Foreign store aliases available to reference fields.
/// TOML: `[stores.<alias>]`. Default: `users` at `sqlite://users.db`, native storage.
pub(super) fn default_stores() -> BTreeMap<String, StoreConfig> {
    BTreeMap::from([(
        "users".to_string(),
        StoreConfig::new("sqlite://users.db", UuidStorage::Native),
    )])
}

fn default_max_connections() -> u32 {
    5
}
