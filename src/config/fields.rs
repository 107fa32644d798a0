use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Declaration of one cross-database reference field.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldConfig {
    /// Alias of the foreign store (a key of `[stores]`) the field resolves against.
    pub store: String,

    /// Whether the local column accepts "no reference".
    /// Default: `true`.
    #[serde(default = "default_true")]
    pub nullable: bool,

    /// Whether forms may leave the field empty (`required = !blank`).
    /// Default: `true`.
    #[serde(default = "default_true")]
    pub blank: bool,

    /// Deadline for a single foreign lookup, in milliseconds.
    /// Default: `5000`.
    #[serde(default = "default_resolve_timeout_ms")]
    pub resolve_timeout_ms: Option<u64>,
}

impl FieldConfig {
    pub fn resolve_timeout(&self) -> Option<Duration> {
        self.resolve_timeout_ms.map(Duration::from_millis)
    }
}

/// Reference fields of the local record schema.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldsConfig {
    /// TOML: `[fields.user_proxy]`.
    #[serde(default = "default_user_proxy")]
    pub user_proxy: FieldConfig,
}

impl Default for FieldsConfig {
    fn default() -> Self {
        Self {
            user_proxy: default_user_proxy(),
        }
    }
}

fn default_user_proxy() -> FieldConfig {
    FieldConfig {
        store: "users".to_string(),
        nullable: true,
        blank: true,
        resolve_timeout_ms: default_resolve_timeout_ms(),
    }
}

fn default_resolve_timeout_ms() -> Option<u64> {
    Some(5000)
}

fn default_true() -> bool {
    true
}
