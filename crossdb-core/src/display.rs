use crate::reference::Reference;
use uuid::Uuid;

/// Anything identified by a `Reference`: the reference itself, or a resolved foreign
/// entity exposing its primary key.
pub trait HasPrimaryKey {
    fn primary_key(&self) -> Reference;
}

impl HasPrimaryKey for Reference {
    fn primary_key(&self) -> Reference {
        *self
    }
}

impl HasPrimaryKey for Uuid {
    fn primary_key(&self) -> Reference {
        Reference::from_uuid(*self)
    }
}

/// Form/display rendering. Always the identifier, never other entity fields.
pub fn to_display<T: HasPrimaryKey + ?Sized>(value: &T) -> String {
    value.primary_key().to_string()
}

/// Empty string for "no reference", as an empty form input.
pub fn to_display_optional<T: HasPrimaryKey>(value: Option<&T>) -> String {
    value.map(to_display).unwrap_or_default()
}
