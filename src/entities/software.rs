//! Software entity - Represents a sellable software product in the catalog.
//!
//! Each software row declares whether fulfillment must draw keys from the
//! license pool (`requires_license`) and whether the pool is scoped per
//! version (`search_by_version`).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Software database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "software")]
pub struct Model {
    /// Unique identifier for the software
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable product name (matched case-insensitively at order time)
    pub name: String,
    /// Whether fulfillment must claim keys from the license pool
    pub requires_license: bool,
    /// Whether a specific version must be selected to scope the pool
    pub search_by_version: bool,
    /// When the software was created
    pub created_at: DateTimeUtc,
    /// When the software was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Software and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One software has many versions
    #[sea_orm(has_many = "super::software_version::Entity")]
    Versions,
    /// One software has many license keys in the pool
    #[sea_orm(has_many = "super::license::Entity")]
    Licenses,
    /// One software has many orders
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl Related<super::software_version::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Versions.def()
    }
}

impl Related<super::license::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Licenses.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Orders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
