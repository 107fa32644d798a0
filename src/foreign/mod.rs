//! Read-only access to foreign stores.
//!
//! Layout:
//! - `entity.rs`: static registration of foreign entity types
//! - `store.rs`: per-alias connections and the point lookup
//! - `resolver.rs`: target binding and the `Resolved` outcome

pub mod entity;
pub mod resolver;
pub mod store;

pub use entity::ForeignEntity;
pub use resolver::{Resolved, Target};
pub use store::{ForeignStore, StoreRegistry};
