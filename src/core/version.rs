//! Software version business logic - Handles version (variant) operations.
//!
//! Versions are the `os`/`version`-labeled variants of a software product.
//! [`find_version`] is the lookup fulfillment uses: request fields that are
//! absent match rows where the column is NULL, so products without variant
//! labels still resolve.

use crate::{
    entities::{Software, SoftwareVersion, software_version},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Retrieves all versions belonging to a software entry.
pub async fn list_versions(
    db: &DatabaseConnection,
    software_id: i64,
) -> Result<Vec<software_version::Model>> {
    SoftwareVersion::find()
        .filter(software_version::Column::SoftwareId.eq(software_id))
        .order_by_asc(software_version::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a version by its unique ID.
pub async fn get_version(
    db: &DatabaseConnection,
    id: i64,
) -> Result<Option<software_version::Model>> {
    SoftwareVersion::find_by_id(id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds the version of a software entry matching an `os`/`version` selector.
///
/// A selector field of `None` matches rows where that column is NULL, so the
/// lookup behaves the same for labeled and unlabeled variants. Generic over
/// the connection so fulfillment can resolve variants inside its transaction.
pub async fn find_version<C>(
    conn: &C,
    software_id: i64,
    os: Option<&str>,
    version: Option<&str>,
) -> Result<Option<software_version::Model>>
where
    C: ConnectionTrait,
{
    let mut query =
        SoftwareVersion::find().filter(software_version::Column::SoftwareId.eq(software_id));

    query = match os {
        Some(os) => query.filter(software_version::Column::Os.eq(os)),
        None => query.filter(software_version::Column::Os.is_null()),
    };
    query = match version {
        Some(version) => query.filter(software_version::Column::Version.eq(version)),
        None => query.filter(software_version::Column::Version.is_null()),
    };

    query.one(conn).await.map_err(Into::into)
}

/// Creates a new version for an existing software entry.
pub async fn create_version(
    db: &DatabaseConnection,
    software_id: i64,
    os: Option<String>,
    version: Option<String>,
    download_link: Option<String>,
) -> Result<software_version::Model> {
    Software::find_by_id(software_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::SoftwareNotFound {
            name: software_id.to_string(),
        })?;

    let now = chrono::Utc::now();
    let model = software_version::ActiveModel {
        software_id: Set(software_id),
        os: Set(os),
        version: Set(version),
        download_link: Set(download_link),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    model.insert(db).await.map_err(Into::into)
}

/// Deletes a version by ID.
pub async fn delete_version(db: &DatabaseConnection, id: i64) -> Result<()> {
    let version = SoftwareVersion::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::VersionNotFound {
            name: id.to_string(),
        })?;

    version.delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_version_requires_software() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_version(&db, 999, None, None, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::SoftwareNotFound { name: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_find_version_by_selector() -> Result<()> {
        let db = setup_test_db().await?;
        let software = create_test_software(&db, "Tool").await?;
        let windows = create_test_version(
            &db,
            software.id,
            Some("windows"),
            Some("1.0"),
            Some("https://dl.example.com/win"),
        )
        .await?;
        create_test_version(&db, software.id, Some("macos"), Some("1.0"), None).await?;

        let found = find_version(&db, software.id, Some("windows"), Some("1.0")).await?;
        assert_eq!(found.unwrap().id, windows.id);

        let miss = find_version(&db, software.id, Some("linux"), Some("1.0")).await?;
        assert!(miss.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_find_version_null_selector_matches_unlabeled() -> Result<()> {
        let db = setup_test_db().await?;
        let software = create_test_software(&db, "Tool").await?;
        let unlabeled =
            create_test_version(&db, software.id, None, None, Some("https://dl.example.com"))
                .await?;
        create_test_version(&db, software.id, Some("windows"), Some("1.0"), None).await?;

        let found = find_version(&db, software.id, None, None).await?;
        assert_eq!(found.unwrap().id, unlabeled.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_list_and_delete_versions() -> Result<()> {
        let db = setup_test_db().await?;
        let software = create_test_software(&db, "Tool").await?;
        let v1 = create_test_version(&db, software.id, Some("windows"), Some("1.0"), None).await?;
        create_test_version(&db, software.id, Some("windows"), Some("2.0"), None).await?;

        let versions = list_versions(&db, software.id).await?;
        assert_eq!(versions.len(), 2);

        delete_version(&db, v1.id).await?;
        assert_eq!(list_versions(&db, software.id).await?.len(), 1);

        let missing = delete_version(&db, v1.id).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::VersionNotFound { name: _ }
        ));

        Ok(())
    }
}
