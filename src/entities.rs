//! Foreign entity types the local schema references.

use crate::foreign::ForeignEntity;

use crossdb_core::{HasPrimaryKey, Reference};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Proxy row for an account living in the users database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct UserProxy {
    pub id: Reference,
    pub user_id: i64,
    pub username: String,
}

impl HasPrimaryKey for UserProxy {
    fn primary_key(&self) -> Reference {
        self.id
    }
}

impl ForeignEntity for UserProxy {
    const ENTITY: &'static str = "users.UserProxy";
    const TABLE: &'static str = "user_proxy";
}
