//! Software version entity - A variant of a software product.
//!
//! Versions are labeled by `os` and `version` and may carry a download link,
//! which doubles as the degraded-fulfillment fallback when the license pool
//! runs short.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Software version database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "software_versions")]
pub struct Model {
    /// Unique identifier for the version
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning software
    pub software_id: i64,
    /// Operating system label (e.g., "windows", "macos")
    pub os: Option<String>,
    /// Version label (e.g., "2024.1")
    pub version: Option<String>,
    /// Direct download link for this version, if any
    pub download_link: Option<String>,
    /// When the version was created
    pub created_at: DateTimeUtc,
    /// When the version was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `SoftwareVersion` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each version belongs to one software
    #[sea_orm(
        belongs_to = "super::software::Entity",
        from = "Column::SoftwareId",
        to = "super::software::Column::Id"
    )]
    Software,
    /// One version has many license keys scoped to it
    #[sea_orm(has_many = "super::license::Entity")]
    Licenses,
}

impl Related<super::software::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Software.def()
    }
}

impl Related<super::license::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Licenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
