//! Database connection and schema management.
//!
//! This module handles the `SQLite` database connection and table creation
//! using `SeaORM`. Tables are generated from the entity definitions with
//! `Schema::create_table_from_entity`, so the database schema matches the
//! Rust struct definitions without requiring manual SQL. The connection is
//! constructed here and passed into the rest of the service explicitly.

use crate::entities::{License, Order, OrderLicense, Software, SoftwareVersion};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};
use tracing::{debug, info, instrument};

/// Default `SQLite` database location when nothing else is configured.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/keystock.sqlite?mode=rwc";

/// Establishes a connection to the database at the given URL.
#[instrument]
pub async fn connect(database_url: &str) -> Result<DatabaseConnection> {
    debug!("Connecting to database at: {}", database_url);
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates all necessary database tables from the entity definitions.
///
/// Tables are created in dependency order (software before versions and
/// licenses, orders before join rows) and skipped when they already exist,
/// so this is safe to run on every startup.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut software_table = schema.create_table_from_entity(Software);
    let mut version_table = schema.create_table_from_entity(SoftwareVersion);
    let mut license_table = schema.create_table_from_entity(License);
    let mut order_table = schema.create_table_from_entity(Order);
    let mut order_license_table = schema.create_table_from_entity(OrderLicense);

    db.execute(builder.build(software_table.if_not_exists()))
        .await?;
    db.execute(builder.build(version_table.if_not_exists()))
        .await?;
    db.execute(builder.build(license_table.if_not_exists()))
        .await?;
    db.execute(builder.build(order_table.if_not_exists())).await?;
    db.execute(builder.build(order_license_table.if_not_exists()))
        .await?;

    info!("Database tables ensured");
    Ok(())
}
