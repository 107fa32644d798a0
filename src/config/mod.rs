mod basic;
mod fields;
mod stores;

pub use basic::BasicConfig;
pub use fields::{FieldConfig, FieldsConfig};
pub use stores::StoreConfig;

use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, path::PathBuf};

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Core server configuration (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Local record store (see `local` table in config.toml).
    #[serde(default = "stores::default_local")]
    pub local: StoreConfig,

    /// Foreign stores by alias (see `stores.<alias>` tables in config.toml).
    #[serde(default = "stores::default_stores")]
    pub stores: BTreeMap<String, StoreConfig>,

    /// Reference field declarations (see `fields` table in config.toml).
    #[serde(default)]
    pub fields: FieldsConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            basic: BasicConfig::default(),
            local: stores::default_local(),
            stores: stores::default_stores(),
            fields: FieldsConfig::default(),
        }
    }
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";

impl Config {
    /// Builds a Figment that merges defaults and a config TOML file.
    pub fn figment() -> Figment {
        let figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment.merge(Toml::file(DEFAULT_CONFIG_FILE))
        } else {
            figment
        }
    }

    /// Loads configuration by merging defaults and `config.toml` if present.
    ///
    /// Note: this does **not** validate required fields like `basic.admin_key`. Binaries should
    /// call `Config::from_toml()` instead.
    pub fn from_optional_toml() -> Self {
        Self::figment().extract().unwrap_or_else(|err| {
            panic!("failed to extract configuration (defaults + optional config.toml): {err}")
        })
    }

    /// Loads configuration from the TOML file (with defaults) and validates required fields.
    pub fn from_toml() -> Self {
        if !PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            panic!("config file not found: {}", DEFAULT_CONFIG_FILE);
        }
        let cfg: Self = Self::figment().extract().unwrap_or_else(|err| {
            panic!(
                "failed to extract configuration from {}: {err}",
                DEFAULT_CONFIG_FILE
            )
        });
        if cfg.basic.admin_key.trim().is_empty() {
            panic!("basic.admin_key must be set and non-empty");
        }
        if !cfg.stores.contains_key(&cfg.fields.user_proxy.store) {
            panic!(
                "fields.user_proxy.store refers to unknown store alias {:?}",
                cfg.fields.user_proxy.store
            );
        }
        cfg
    }
}
