use serde::Serialize;

/// Serializable description of a field binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    pub name: String,
    pub entity: &'static str,
    pub table: &'static str,
    pub store: String,
    pub nullable: bool,
}

/// What a form needs to render the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormSpec {
    pub name: String,
    pub label: String,
    pub required: bool,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub help_text: String,
    /// Display form of the current value, empty when unset.
    pub initial: String,
}

pub(super) fn capfirst(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
