//! Order-license join entity - Records which license keys an order claimed.
//!
//! These rows are created in the same transaction as the order and are the
//! single source of truth for "which keys belong to which order"; deletion
//! consults them rather than recomputing pool state.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Order-license join row
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "order_licenses")]
pub struct Model {
    /// ID of the order that claimed the license
    #[sea_orm(primary_key, auto_increment = false)]
    pub order_id: i64,
    /// ID of the claimed license
    #[sea_orm(primary_key, auto_increment = false)]
    pub license_id: i64,
}

/// Defines relationships between `OrderLicense` and the linked entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each join row belongs to one order
    #[sea_orm(
        belongs_to = "super::order::Entity",
        from = "Column::OrderId",
        to = "super::order::Column::Id"
    )]
    Order,
    /// Each join row belongs to one license
    #[sea_orm(
        belongs_to = "super::license::Entity",
        from = "Column::LicenseId",
        to = "super::license::Column::Id"
    )]
    License,
}

impl Related<super::order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Order.def()
    }
}

impl Related<super::license::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::License.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
