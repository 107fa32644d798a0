use crate::display::HasPrimaryKey;
use crate::error::ValidationError;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Canonical identifier of a row living in a foreign store.
///
/// Always a well-formed 128-bit UUID; the only way to build one from untrusted input
/// is through [`normalize`] or [`Reference::parse_hex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Reference(Uuid);

impl Reference {
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub const fn from_u128(value: u128) -> Self {
        Self(Uuid::from_u128(value))
    }

    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn as_u128(&self) -> u128 {
        self.0.as_u128()
    }

    /// 32 lowercase hex characters, no dashes.
    pub fn simple(&self) -> String {
        self.0.simple().to_string()
    }

    /// Parses the hex form of a UUID.
    ///
    /// `urn:` / `uuid:` prefixes, surrounding braces and dashes are stripped first, so
    /// `"0123456789abcdef0123456789abcdef"`, the hyphenated form and
    /// `"{01234567-89ab-cdef-0123-456789abcdef}"` all parse to the same value.
    pub fn parse_hex(text: &str) -> Result<Self, ValidationError> {
        let stripped = text.strip_prefix("urn:").unwrap_or(text);
        let stripped = stripped.strip_prefix("uuid:").unwrap_or(stripped);
        let digits: String = stripped
            .trim_start_matches('{')
            .trim_end_matches('}')
            .chars()
            .filter(|c| *c != '-')
            .collect();

        if digits.len() != 32 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ValidationError::invalid(text));
        }
        u128::from_str_radix(&digits, 16)
            .map(Self::from_u128)
            .map_err(|_| ValidationError::invalid(text))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0.hyphenated(), f)
    }
}

impl FromStr for Reference {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_hex(s)
    }
}

impl From<Uuid> for Reference {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<Reference> for Uuid {
    fn from(reference: Reference) -> Self {
        reference.0
    }
}

impl Serialize for Reference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0.hyphenated())
    }
}

impl<'de> Deserialize<'de> for Reference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ReferenceVisitor)
    }
}

struct ReferenceVisitor;

impl Visitor<'_> for ReferenceVisitor {
    type Value = Reference;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a UUID hex string or a 128-bit unsigned integer")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        Reference::parse_hex(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(Reference::from_u128(u128::from(v)))
    }

    fn visit_u128<E: de::Error>(self, v: u128) -> Result<Self::Value, E> {
        Ok(Reference::from_u128(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        self.visit_i128(i128::from(v))
    }

    fn visit_i128<E: de::Error>(self, v: i128) -> Result<Self::Value, E> {
        u128::try_from(v)
            .map(Reference::from_u128)
            .map_err(|_| E::custom(ValidationError::invalid(v)))
    }
}

/// Any value a caller may hand to a reference field before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Uuid(Uuid),
    Unsigned(u128),
    Signed(i128),
    /// Hex form (dashes, braces and `urn:uuid:` prefix tolerated).
    Text(String),
    /// Anything without a UUID reading (booleans, floats, arrays, objects).
    Other(String),
}

impl RawValue {
    /// An already-resolved foreign entity normalizes to its primary key.
    pub fn entity<T: HasPrimaryKey + ?Sized>(entity: &T) -> Self {
        RawValue::Uuid(*entity.primary_key().as_uuid())
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Null => f.write_str("null"),
            RawValue::Uuid(uuid) => write!(f, "{uuid}"),
            RawValue::Unsigned(v) => write!(f, "{v}"),
            RawValue::Signed(v) => write!(f, "{v}"),
            RawValue::Text(s) | RawValue::Other(s) => f.write_str(s),
        }
    }
}

impl From<Uuid> for RawValue {
    fn from(v: Uuid) -> Self {
        RawValue::Uuid(v)
    }
}

impl From<Reference> for RawValue {
    fn from(v: Reference) -> Self {
        RawValue::Uuid(v.0)
    }
}

impl From<u128> for RawValue {
    fn from(v: u128) -> Self {
        RawValue::Unsigned(v)
    }
}

impl From<u64> for RawValue {
    fn from(v: u64) -> Self {
        RawValue::Unsigned(u128::from(v))
    }
}

impl From<i128> for RawValue {
    fn from(v: i128) -> Self {
        RawValue::Signed(v)
    }
}

impl From<i64> for RawValue {
    fn from(v: i64) -> Self {
        RawValue::Signed(i128::from(v))
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(RawValue::Null, Into::into)
    }
}

impl From<serde_json::Value> for RawValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;

        match v {
            Value::Null => RawValue::Null,
            Value::String(s) => RawValue::Text(s),
            Value::Number(n) => {
                // Numbers keep their source digits, so integers past 64 bits parse exactly.
                let digits = n.to_string();
                if let Ok(u) = digits.parse::<u128>() {
                    RawValue::Unsigned(u)
                } else if let Ok(i) = digits.parse::<i128>() {
                    RawValue::Signed(i)
                } else {
                    RawValue::Other(digits)
                }
            }
            other @ (Value::Bool(_) | Value::Array(_) | Value::Object(_)) => {
                RawValue::Other(other.to_string())
            }
        }
    }
}

/// Normalizes any admissible representation to a canonical `Reference`.
///
/// `Null` stays `None`. Integers outside `[0, 2^128)` and strings without a 32-digit
/// hex reading are rejected with an `invalid` validation error.
pub fn normalize(raw: impl Into<RawValue>) -> Result<Option<Reference>, ValidationError> {
    match raw.into() {
        RawValue::Null => Ok(None),
        RawValue::Uuid(uuid) => Ok(Some(Reference(uuid))),
        RawValue::Unsigned(v) => Ok(Some(Reference::from_u128(v))),
        RawValue::Signed(v) => u128::try_from(v)
            .map(|v| Some(Reference::from_u128(v)))
            .map_err(|_| ValidationError::invalid(v)),
        RawValue::Text(s) => Reference::parse_hex(&s).map(Some),
        other @ RawValue::Other(_) => Err(ValidationError::invalid(other)),
    }
}
