//! Storage codec for reference columns.
//!
//! A backend either has a native UUID column (16-byte BLOB on SQLite) or stores the
//! reference as fixed-width 32-character lowercase hex text.

use crate::error::DecodeError;
use crate::reference::Reference;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Backend capability deciding how references are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UuidStorage {
    Native,
    #[default]
    Hex,
}

impl UuidStorage {
    pub fn has_native_uuid_field(self) -> bool {
        matches!(self, UuidStorage::Native)
    }

    /// SQLite column type for a reference column.
    pub fn column_type(self) -> &'static str {
        match self {
            UuidStorage::Native => "BLOB",
            UuidStorage::Hex => "TEXT",
        }
    }

    /// Fixed `length()` of a stored value: bytes for BLOB, characters for TEXT.
    pub fn stored_width(self) -> usize {
        match self {
            UuidStorage::Native => 16,
            UuidStorage::Hex => 32,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StorageValue {
    Native(Uuid),
    Hex(String),
}

impl StorageValue {
    pub fn storage(&self) -> UuidStorage {
        match self {
            StorageValue::Native(_) => UuidStorage::Native,
            StorageValue::Hex(_) => UuidStorage::Hex,
        }
    }
}

pub fn encode(reference: Option<Reference>, storage: UuidStorage) -> Option<StorageValue> {
    let reference = reference?;
    Some(match storage {
        UuidStorage::Native => StorageValue::Native(*reference.as_uuid()),
        UuidStorage::Hex => StorageValue::Hex(reference.simple()),
    })
}

pub fn decode(stored: Option<StorageValue>) -> Result<Option<Reference>, DecodeError> {
    match stored {
        None => Ok(None),
        Some(StorageValue::Native(uuid)) => Ok(Some(Reference::from_uuid(uuid))),
        Some(StorageValue::Hex(text)) => decode_hex(&text).map(Some),
    }
}

/// Strict column decoding: exactly 32 hex digits, no dashes or braces.
pub fn decode_hex(text: &str) -> Result<Reference, DecodeError> {
    if text.len() != 32 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(DecodeError::MalformedHex {
            value: text.to_string(),
        });
    }
    u128::from_str_radix(text, 16)
        .map(Reference::from_u128)
        .map_err(|_| DecodeError::MalformedHex {
            value: text.to_string(),
        })
}

pub fn decode_bytes(bytes: &[u8]) -> Result<Reference, DecodeError> {
    Uuid::from_slice(bytes)
        .map(Reference::from_uuid)
        .map_err(|_| DecodeError::WrongWidth(bytes.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::normalize;

    const HEX: &str = "0123456789abcdef0123456789abcdef";

    #[test]
    fn hex_backend_stores_dashless_lowercase() {
        let reference = normalize("01234567-89AB-CDEF-0123-456789ABCDEF").unwrap();
        let stored = encode(reference, UuidStorage::Hex);
        assert_eq!(stored, Some(StorageValue::Hex(HEX.to_string())));
        assert_eq!(decode(stored).unwrap(), reference);
    }

    #[test]
    fn native_backend_stores_uuid() {
        let reference = normalize(HEX).unwrap();
        let stored = encode(reference, UuidStorage::Native);
        assert_eq!(
            stored,
            Some(StorageValue::Native(*reference.unwrap().as_uuid()))
        );
        assert_eq!(decode(stored).unwrap(), reference);
    }

    #[test]
    fn null_propagates_both_ways() {
        assert_eq!(encode(None, UuidStorage::Hex), None);
        assert_eq!(encode(None, UuidStorage::Native), None);
        assert_eq!(decode(None).unwrap(), None);
    }

    #[test]
    fn round_trip_holds_for_hex_inputs() {
        let samples = [
            HEX.to_string(),
            "ffffffffffffffffffffffffffffffff".to_string(),
            "00000000000000000000000000000000".to_string(),
            Reference::new_v4().simple(),
        ];
        for hex in samples {
            let normalized = normalize(hex.as_str()).unwrap();
            for storage in [UuidStorage::Hex, UuidStorage::Native] {
                assert_eq!(decode(encode(normalized, storage)).unwrap(), normalized);
            }
        }
    }

    #[test]
    fn malformed_stored_values_are_errors() {
        let dashed = StorageValue::Hex("01234567-89ab-cdef-0123-456789abcdef".to_string());
        assert!(matches!(
            decode(Some(dashed)),
            Err(DecodeError::MalformedHex { .. })
        ));
        assert!(decode(Some(StorageValue::Hex(String::new()))).is_err());
        assert_eq!(decode_bytes(&[0_u8; 15]), Err(DecodeError::WrongWidth(15)));
    }

    #[test]
    fn storage_capability_parses_lowercase() {
        let native: UuidStorage = serde_json::from_str("\"native\"").unwrap();
        assert!(native.has_native_uuid_field());
        assert_eq!(UuidStorage::default(), UuidStorage::Hex);
        assert_eq!(
            StorageValue::Hex(HEX.to_string()).storage(),
            UuidStorage::Hex
        );
    }
}
