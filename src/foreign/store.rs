use super::entity::ForeignEntity;
use crate::config::StoreConfig;
use crate::error::ResolutionError;

use crossdb_core::{Reference, UuidStorage, codec};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::collections::{BTreeMap, HashMap};
use std::{str::FromStr, sync::Arc, time::Duration};
use tracing::{debug, info};

/// One foreign database, opened read-only.
///
/// Cloning shares the underlying pool.
#[derive(Debug, Clone)]
pub struct ForeignStore {
    alias: Arc<str>,
    pool: SqlitePool,
    uuid_storage: UuidStorage,
}

impl ForeignStore {
    pub async fn connect(alias: &str, cfg: &StoreConfig) -> Result<Self, sqlx::Error> {
        let connect_opts = SqliteConnectOptions::from_str(cfg.database_url.as_str())?
            .read_only(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(cfg.max_connections)
            .connect_with(connect_opts)
            .await?;

        info!(
            store = alias,
            uuid_storage = ?cfg.uuid_storage,
            "foreign store connected"
        );
        Ok(Self::from_pool(alias, pool, cfg.uuid_storage))
    }

    /// Wraps an existing pool; the caller keeps responsibility for opening it read-only.
    pub fn from_pool(alias: &str, pool: SqlitePool, uuid_storage: UuidStorage) -> Self {
        Self {
            alias: Arc::from(alias),
            pool,
            uuid_storage,
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn uuid_storage(&self) -> UuidStorage {
        self.uuid_storage
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Checks that `E`'s key column holds the storage form this store is declared with.
    ///
    /// One stored key is sampled; an empty table falls back to the column's declared type.
    /// A mismatch would otherwise make every lookup read as absent.
    pub async fn check_key_storage<E: ForeignEntity>(&self) -> Result<(), ResolutionError> {
        let store_error = |source: sqlx::Error| ResolutionError::Store {
            store: self.alias.to_string(),
            entity: E::ENTITY,
            source,
        };

        let sql = format!(
            r#"SELECT typeof("{pk}") FROM "{table}" WHERE "{pk}" IS NOT NULL LIMIT 1"#,
            table = E::TABLE,
            pk = E::PRIMARY_KEY
        );
        let sampled: Option<String> = sqlx::query_scalar(&sql)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_error)?;

        let class = match sampled {
            Some(kind) => KeyClass::sampled(&kind),
            None => {
                let declared: Option<String> =
                    sqlx::query_scalar("SELECT type FROM pragma_table_info(?) WHERE name = ?")
                        .bind(E::TABLE)
                        .bind(E::PRIMARY_KEY)
                        .fetch_optional(&self.pool)
                        .await
                        .map_err(store_error)?;
                declared.map_or(KeyClass::Untyped, |decl| KeyClass::declared(&decl))
            }
        };

        if class.holds(self.uuid_storage) {
            debug!(
                store = %self.alias,
                entity = E::ENTITY,
                key_class = class.as_str(),
                "foreign key storage verified"
            );
            Ok(())
        } else {
            Err(ResolutionError::StorageMismatch {
                store: self.alias.to_string(),
                entity: E::ENTITY,
                declared: self.uuid_storage,
                found: class.as_str(),
            })
        }
    }

    /// Point lookup: the `E` row whose primary key equals `key`.
    ///
    /// `Ok(None)` is the only not-found signal; every other failure is an `Err`.
    pub async fn get_by_primary_key<E: ForeignEntity>(
        &self,
        key: Reference,
    ) -> Result<Option<E>, sqlx::Error> {
        let sql = format!(
            r#"SELECT * FROM "{table}" WHERE "{pk}" = ? LIMIT 1"#,
            table = E::TABLE,
            pk = E::PRIMARY_KEY
        );
        sqlx::query_as::<_, E>(&sql)
            .bind(codec::encode(Some(key), self.uuid_storage))
            .fetch_optional(&self.pool)
            .await
    }
}

/// Foreign stores by alias, built once at startup and handed to field bindings.
#[derive(Debug, Clone, Default)]
pub struct StoreRegistry {
    stores: HashMap<String, ForeignStore>,
}

impl StoreRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn connect_all(
        stores: &BTreeMap<String, StoreConfig>,
    ) -> Result<Self, sqlx::Error> {
        let mut registry = Self::new();
        for (alias, cfg) in stores {
            registry.insert(ForeignStore::connect(alias, cfg).await?);
        }
        Ok(registry)
    }

    /// Registers a store under its alias, replacing any previous one.
    pub fn insert(&mut self, store: ForeignStore) {
        self.stores.insert(store.alias().to_string(), store);
    }

    pub fn get(&self, alias: &str) -> Result<&ForeignStore, ResolutionError> {
        self.stores
            .get(alias)
            .ok_or_else(|| ResolutionError::UnknownStore(alias.to_string()))
    }

    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.stores.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }

    pub async fn close_all(&self) {
        for store in self.stores.values() {
            store.close().await;
        }
    }
}

/// Storage class of a key column, from a sampled `typeof()` or SQLite's affinity rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyClass {
    Text,
    Blob,
    /// No affinity to go by; any storage form is accepted.
    Untyped,
    /// Integers, reals, or anything else a UUID key cannot be.
    Other,
}

impl KeyClass {
    fn sampled(kind: &str) -> Self {
        match kind {
            "text" => KeyClass::Text,
            "blob" => KeyClass::Blob,
            _ => KeyClass::Other,
        }
    }

    fn declared(decl: &str) -> Self {
        let decl = decl.to_ascii_uppercase();
        if decl.contains("INT") {
            KeyClass::Other
        } else if ["CHAR", "CLOB", "TEXT"].iter().any(|t| decl.contains(t)) {
            KeyClass::Text
        } else if decl.contains("BLOB") {
            KeyClass::Blob
        } else {
            KeyClass::Untyped
        }
    }

    fn holds(self, storage: UuidStorage) -> bool {
        match self {
            KeyClass::Text => storage == UuidStorage::Hex,
            KeyClass::Blob => storage == UuidStorage::Native,
            KeyClass::Untyped => true,
            KeyClass::Other => false,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            KeyClass::Text => "text",
            KeyClass::Blob => "blob",
            KeyClass::Untyped => "untyped",
            KeyClass::Other => "non-uuid",
        }
    }
}
