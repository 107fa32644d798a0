pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod field;
pub mod foreign;
pub mod server;
mod utils;

pub use error::{CrossDbError, ResolutionError};
pub use field::{CrossDatabaseField, FieldOptions, TypedField};
pub use foreign::{ForeignEntity, ForeignStore, Resolved, StoreRegistry, Target};
