//! Local record store: the database holding records and their references.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `patch.rs`: create/patch payloads

pub mod actor;
pub mod models;
pub mod patch;
pub mod schema;

mod patch_impl;

pub use models::DbLocalRecord;
pub use patch::{DbPatchable, RecordCreate, RecordPatch};
pub use schema::sqlite_init;

pub use actor::{DbActorHandle, spawn};
