//! License entity - A single license key in the scarce pool.
//!
//! `is_active = true` means the key has been consumed by an order (or by
//! manual activation); `used_at` records when. The uniqueness constraint on
//! `license_key` is the last line of defense against double allocation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// License database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "licenses")]
pub struct Model {
    /// Unique identifier for the license row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning software
    pub software_id: i64,
    /// ID of the version this key is scoped to, if the pool is version-scoped
    pub software_version_id: Option<i64>,
    /// The license key string itself
    #[sea_orm(unique)]
    pub license_key: String,
    /// Whether the key has been consumed
    pub is_active: bool,
    /// When the key was consumed, if it has been
    pub used_at: Option<DateTimeUtc>,
    /// When the key was imported
    pub created_at: DateTimeUtc,
    /// When the key was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between License and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each license belongs to one software
    #[sea_orm(
        belongs_to = "super::software::Entity",
        from = "Column::SoftwareId",
        to = "super::software::Column::Id"
    )]
    Software,
    /// Each license may be scoped to one software version
    #[sea_orm(
        belongs_to = "super::software_version::Entity",
        from = "Column::SoftwareVersionId",
        to = "super::software_version::Column::Id"
    )]
    Version,
    /// Join rows linking this license to the order that claimed it
    #[sea_orm(has_many = "super::order_license::Entity")]
    OrderLicenses,
}

impl Related<super::software::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Software.def()
    }
}

impl Related<super::software_version::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Version.def()
    }
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        super::order_license::Relation::Order.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::order_license::Relation::License.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
