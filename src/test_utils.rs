//! Shared test utilities for `KeyStock`.
//!
//! This module provides common helper functions for setting up test
//! databases and creating test entities with sensible defaults.

use crate::{
    core::{license, software, version},
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Creates a test software entry with sensible defaults.
///
/// # Defaults
/// * `requires_license`: true
/// * `search_by_version`: false
pub async fn create_test_software(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::software::Model> {
    software::create_software(db, name.to_string(), true, false).await
}

/// Creates a test software entry with custom flags.
/// Use this when you need to test specific catalog configurations.
pub async fn create_custom_software(
    db: &DatabaseConnection,
    name: &str,
    requires_license: bool,
    search_by_version: bool,
) -> Result<entities::software::Model> {
    software::create_software(db, name.to_string(), requires_license, search_by_version).await
}

/// Creates a test version for a software entry.
pub async fn create_test_version(
    db: &DatabaseConnection,
    software_id: i64,
    os: Option<&str>,
    version_label: Option<&str>,
    download_link: Option<&str>,
) -> Result<entities::software_version::Model> {
    version::create_version(
        db,
        software_id,
        os.map(ToString::to_string),
        version_label.map(ToString::to_string),
        download_link.map(ToString::to_string),
    )
    .await
}

/// Seeds the license pool through the bulk-import path.
/// Returns the created rows in ascending-id order.
pub async fn seed_test_licenses(
    db: &DatabaseConnection,
    software_id: i64,
    software_version_id: Option<i64>,
    keys: &[&str],
) -> Result<Vec<entities::license::Model>> {
    license::import_licenses(
        db,
        software_id,
        software_version_id,
        keys.iter().map(ToString::to_string).collect(),
    )
    .await
}

/// Sets up a complete test environment with a licensed software entry.
/// Returns (db, software) for common test scenarios.
pub async fn setup_with_software() -> Result<(DatabaseConnection, entities::software::Model)> {
    let db = setup_test_db().await?;
    let software = create_test_software(&db, "Tool").await?;
    Ok((db, software))
}
