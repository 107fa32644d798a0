//! SQLite bindings: `StorageValue` binds as BLOB or TEXT, and a `Reference` column
//! decodes from either storage form.

use crate::codec::{self, StorageValue};
use crate::reference::Reference;

use sqlx::encode::IsNull;
use sqlx::error::BoxDynError;
use sqlx::sqlite::{SqliteTypeInfo, SqliteValueRef};
use sqlx::{Database, Decode, Encode, Sqlite, Type, TypeInfo, ValueRef};
use uuid::Uuid;

impl Type<Sqlite> for StorageValue {
    fn type_info() -> SqliteTypeInfo {
        <Vec<u8> as Type<Sqlite>>::type_info()
    }

    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <Vec<u8> as Type<Sqlite>>::compatible(ty) || <String as Type<Sqlite>>::compatible(ty)
    }
}

impl<'q> Encode<'q, Sqlite> for StorageValue {
    fn encode_by_ref(
        &self,
        buf: &mut <Sqlite as Database>::ArgumentBuffer<'q>,
    ) -> Result<IsNull, BoxDynError> {
        match self {
            StorageValue::Native(uuid) => <Uuid as Encode<'q, Sqlite>>::encode_by_ref(uuid, buf),
            StorageValue::Hex(text) => <String as Encode<'q, Sqlite>>::encode_by_ref(text, buf),
        }
    }
}

/// Reads the column as stored, without validating hex text; `codec::decode` does that.
impl<'r> Decode<'r, Sqlite> for StorageValue {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let is_text = value.type_info().name() == "TEXT";
        if is_text {
            let text = <String as Decode<Sqlite>>::decode(value)?;
            Ok(StorageValue::Hex(text))
        } else {
            let bytes = <&[u8] as Decode<Sqlite>>::decode(value)?;
            let reference = codec::decode_bytes(bytes)?;
            Ok(StorageValue::Native(*reference.as_uuid()))
        }
    }
}

impl Type<Sqlite> for Reference {
    fn type_info() -> SqliteTypeInfo {
        <StorageValue as Type<Sqlite>>::type_info()
    }

    fn compatible(ty: &SqliteTypeInfo) -> bool {
        <StorageValue as Type<Sqlite>>::compatible(ty)
    }
}

impl<'r> Decode<'r, Sqlite> for Reference {
    fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
        let is_text = value.type_info().name() == "TEXT";
        if is_text {
            let text = <&str as Decode<Sqlite>>::decode(value)?;
            Ok(codec::decode_hex(text)?)
        } else {
            let bytes = <&[u8] as Decode<Sqlite>>::decode(value)?;
            Ok(codec::decode_bytes(bytes)?)
        }
    }
}
