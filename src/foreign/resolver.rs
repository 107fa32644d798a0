use super::entity::ForeignEntity;
use super::store::{ForeignStore, StoreRegistry};
use crate::error::ResolutionError;

use crossdb_core::Reference;
use std::marker::PhantomData;
use std::time::Duration;
use tracing::{debug, warn};

/// Outcome of a successful lookup. `Absent` is a value, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<E> {
    Found(E),
    Absent,
}

impl<E> Resolved<E> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Resolved::Absent)
    }

    pub fn into_option(self) -> Option<E> {
        match self {
            Resolved::Found(entity) => Some(entity),
            Resolved::Absent => None,
        }
    }
}

impl<E> From<Option<E>> for Resolved<E> {
    fn from(value: Option<E>) -> Self {
        value.map_or(Resolved::Absent, Resolved::Found)
    }
}

/// Static binding of an entity type to a foreign store.
///
/// Bound once at configuration time; holds no per-call state, so it can be cloned into
/// any number of tasks.
pub struct Target<E> {
    store: ForeignStore,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for Target<E> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> std::fmt::Debug for Target<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Target")
            .field("store", &self.store.alias())
            .field("entity", &std::any::type_name::<E>())
            .finish()
    }
}

impl<E: ForeignEntity> Target<E> {
    /// Binds `E` to `store` after checking its key column against the declared storage form.
    pub async fn new(store: ForeignStore) -> Result<Self, ResolutionError> {
        store.check_key_storage::<E>().await?;
        Ok(Self {
            store,
            _entity: PhantomData,
        })
    }

    /// Binds `E` to the store registered under `alias`.
    pub async fn bind(registry: &StoreRegistry, alias: &str) -> Result<Self, ResolutionError> {
        Self::new(registry.get(alias)?.clone()).await
    }

    pub fn store(&self) -> &ForeignStore {
        &self.store
    }

    /// Issues exactly one read against the foreign store.
    ///
    /// With a `deadline`, a lookup still pending when it elapses fails with
    /// `ResolutionError::Timeout`.
    pub async fn resolve(
        &self,
        reference: Reference,
        deadline: Option<Duration>,
    ) -> Result<Resolved<E>, ResolutionError> {
        let store = self.store.alias();
        let lookup = self.store.get_by_primary_key::<E>(reference);

        let result = match deadline {
            Some(after) => tokio::time::timeout(after, lookup).await.map_err(|_| {
                warn!(
                    store,
                    entity = E::ENTITY,
                    %reference,
                    after_ms = u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
                    "foreign lookup timed out"
                );
                ResolutionError::Timeout {
                    store: store.to_string(),
                    entity: E::ENTITY,
                    after,
                }
            })?,
            None => lookup.await,
        };

        match result {
            Ok(row) => {
                let resolved = Resolved::from(row);
                debug!(
                    store,
                    entity = E::ENTITY,
                    %reference,
                    absent = resolved.is_absent(),
                    "foreign lookup"
                );
                Ok(resolved)
            }
            Err(source) => {
                warn!(
                    store,
                    entity = E::ENTITY,
                    %reference,
                    error = %source,
                    "foreign lookup failed"
                );
                Err(ResolutionError::Store {
                    store: store.to_string(),
                    entity: E::ENTITY,
                    source,
                })
            }
        }
    }
}
