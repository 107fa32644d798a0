use crossdb_core::HasPrimaryKey;
use sqlx::FromRow;
use sqlx::sqlite::SqliteRow;

/// A row type living in a foreign store, registered statically by implementing this trait.
///
/// The primary key column must hold a UUID in either storage form; `Reference` decodes both.
pub trait ForeignEntity:
    HasPrimaryKey + for<'r> FromRow<'r, SqliteRow> + Send + Sync + Unpin + 'static
{
    /// Symbolic name used in descriptors and logs.
    const ENTITY: &'static str;

    /// Table holding the rows.
    const TABLE: &'static str;

    /// Primary key column.
    const PRIMARY_KEY: &'static str = "id";
}
