//! Order entity - A fulfilled (or pending) purchase.
//!
//! Orders denormalize the requested `item_name`, `os`, and `version` so the
//! record survives catalog edits. The license keys granted to an order are
//! tracked exclusively through `order_licenses` join rows.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    /// Unique identifier for the order row
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Business-facing order reference supplied by the storefront
    pub order_id: String,
    /// Product name as requested
    pub item_name: String,
    /// Requested operating system label, if any
    pub os: Option<String>,
    /// Requested version label, if any
    pub version: Option<String>,
    /// Number of license keys requested
    pub license_count: i32,
    /// Order status: `"pending"` or `"processed"`
    pub status: String,
    /// ID of the software this order was resolved against
    pub software_id: Option<i64>,
    /// ID of the user who placed the order, if known
    pub user_id: Option<String>,
    /// When the order was created
    pub created_at: DateTimeUtc,
    /// When the order was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Order and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each order may reference one software
    #[sea_orm(
        belongs_to = "super::software::Entity",
        from = "Column::SoftwareId",
        to = "super::software::Column::Id"
    )]
    Software,
    /// Join rows linking this order to its claimed licenses
    #[sea_orm(has_many = "super::order_license::Entity")]
    OrderLicenses,
}

impl Related<super::software::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Software.def()
    }
}

impl Related<super::license::Entity> for Entity {
    fn to() -> RelationDef {
        super::order_license::Relation::License.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::order_license::Relation::Order.def().rev())
    }
}

impl ActiveModelBehavior for ActiveModel {}
