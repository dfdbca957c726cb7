//! Key-value entity - Backs the persistent store of named collections.
//!
//! Each row holds one collection serialized as JSON text under its key.
//! Collections are always written whole; there is no row-per-record layout.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Persistent store database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "kv_store")]
pub struct Model {
    /// Collection key (e.g., `"students"`, `"adminSettings"`)
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// Serialized JSON value of the whole collection
    #[sea_orm(column_type = "Text")]
    pub value: String,
    /// When this collection was last written
    pub updated_at: DateTimeUtc,
}

/// `KvEntry` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
