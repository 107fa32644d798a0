//! Cross-database reference field.
//!
//! The local record persists only the `Reference`; reading the field resolves it
//! lazily against the bound foreign store.

mod form;

pub use form::{FieldDescriptor, FormSpec};

use crate::config::FieldConfig;
use crate::error::ResolutionError;
use crate::foreign::{ForeignEntity, Resolved, StoreRegistry, Target};

use crossdb_core::{
    DecodeError, RawValue, Reference, StorageValue, UuidStorage, ValidationError, codec,
    to_display_optional,
};
use std::time::Duration;

/// Contract a typed persistence field exposes to the schema/form layer.
pub trait TypedField {
    type Value;
    type Stored;

    fn normalize(&self, raw: RawValue) -> Result<Option<Self::Value>, ValidationError>;

    fn to_storage(&self, value: Option<Self::Value>, backend: UuidStorage)
    -> Option<Self::Stored>;

    fn from_storage(&self, stored: Option<Self::Stored>)
    -> Result<Option<Self::Value>, DecodeError>;

    fn to_display(&self, value: Option<&Self::Value>) -> String;
}

#[derive(Debug, Clone)]
pub struct FieldOptions {
    /// Column accepts "no reference".
    pub nullable: bool,
    /// Forms may leave the field empty.
    pub blank: bool,
    pub verbose_name: Option<String>,
    pub help_text: String,
    /// Deadline for a single foreign lookup.
    pub resolve_timeout: Option<Duration>,
}

impl Default for FieldOptions {
    fn default() -> Self {
        Self {
            nullable: true,
            blank: true,
            verbose_name: None,
            help_text: String::new(),
            resolve_timeout: None,
        }
    }
}

impl From<&FieldConfig> for FieldOptions {
    fn from(cfg: &FieldConfig) -> Self {
        Self {
            nullable: cfg.nullable,
            blank: cfg.blank,
            resolve_timeout: cfg.resolve_timeout(),
            ..Self::default()
        }
    }
}

/// Read-only reference to an `E` row living in another database.
#[derive(Debug, Clone)]
pub struct CrossDatabaseField<E> {
    name: String,
    target: Target<E>,
    options: FieldOptions,
}

impl<E: ForeignEntity> CrossDatabaseField<E> {
    pub fn new(name: impl Into<String>, target: Target<E>, options: FieldOptions) -> Self {
        Self {
            name: name.into(),
            target,
            options,
        }
    }

    /// Declares the field from configuration, binding it to its store alias.
    pub async fn from_config(
        name: impl Into<String>,
        registry: &StoreRegistry,
        cfg: &FieldConfig,
    ) -> Result<Self, ResolutionError> {
        let target = Target::bind(registry, &cfg.store).await?;
        Ok(Self::new(name, target, FieldOptions::from(cfg)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    pub fn target(&self) -> &Target<E> {
        &self.target
    }

    /// Normalization followed by field-level validation.
    pub fn clean(&self, raw: impl Into<RawValue>) -> Result<Option<Reference>, ValidationError> {
        let value = self.normalize(raw.into())?;
        if value.is_none() && !self.options.nullable {
            return Err(ValidationError::null());
        }
        Ok(value)
    }

    /// Resolves with the field's configured deadline.
    pub async fn resolve(&self, reference: Reference) -> Result<Resolved<E>, ResolutionError> {
        self.target
            .resolve(reference, self.options.resolve_timeout)
            .await
    }

    /// `None` for "no reference"; otherwise one lookup.
    pub async fn resolve_optional(
        &self,
        reference: Option<Reference>,
    ) -> Result<Option<Resolved<E>>, ResolutionError> {
        match reference {
            Some(reference) => self.resolve(reference).await.map(Some),
            None => Ok(None),
        }
    }

    /// Decodes a stored column value and resolves it.
    pub async fn load(
        &self,
        stored: Option<StorageValue>,
    ) -> Result<Option<Resolved<E>>, ResolutionError> {
        let reference = self.from_storage(stored)?;
        self.resolve_optional(reference).await
    }

    pub fn descriptor(&self) -> FieldDescriptor {
        FieldDescriptor {
            name: self.name.clone(),
            entity: E::ENTITY,
            table: E::TABLE,
            store: self.target.store().alias().to_string(),
            nullable: self.options.nullable,
        }
    }

    pub fn form_spec(&self, initial: Option<&Reference>) -> FormSpec {
        let label = self
            .options
            .verbose_name
            .clone()
            .unwrap_or_else(|| self.name.replace('_', " "));
        FormSpec {
            name: self.name.clone(),
            label: form::capfirst(&label),
            required: !self.options.blank,
            help_text: self.options.help_text.clone(),
            initial: self.to_display(initial),
        }
    }
}

impl<E: ForeignEntity> TypedField for CrossDatabaseField<E> {
    type Value = Reference;
    type Stored = StorageValue;

    fn normalize(&self, raw: RawValue) -> Result<Option<Reference>, ValidationError> {
        crossdb_core::normalize(raw)
    }

    fn to_storage(&self, value: Option<Reference>, backend: UuidStorage) -> Option<StorageValue> {
        codec::encode(value, backend)
    }

    fn from_storage(&self, stored: Option<StorageValue>) -> Result<Option<Reference>, DecodeError> {
        codec::decode(stored)
    }

    fn to_display(&self, value: Option<&Reference>) -> String {
        to_display_optional(value)
    }
}
