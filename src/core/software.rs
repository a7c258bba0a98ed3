//! Software catalog business logic - Handles all software-related operations.
//!
//! Provides functions for creating, retrieving, updating, and deleting
//! software entries. Fulfillment resolves products through
//! [`find_software_by_name`], which matches case-insensitively so storefront
//! spelling differences do not break order processing.

use crate::{
    entities::{Software, software},
    errors::{Error, Result},
};
use sea_orm::{
    QueryOrder, Set,
    prelude::*,
    sea_query::{Expr, Func},
};

/// Retrieves all software entries, ordered alphabetically by name.
pub async fn list_software(db: &DatabaseConnection) -> Result<Vec<software::Model>> {
    Software::find()
        .order_by_asc(software::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves a software entry by its unique ID.
pub async fn get_software(db: &DatabaseConnection, id: i64) -> Result<Option<software::Model>> {
    Software::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Finds a software entry by name, matching case-insensitively.
///
/// Generic over the connection so fulfillment can run the lookup inside its
/// reservation transaction.
pub async fn find_software_by_name<C>(conn: &C, name: &str) -> Result<Option<software::Model>>
where
    C: ConnectionTrait,
{
    Software::find()
        .filter(
            Expr::expr(Func::lower(Expr::col(software::Column::Name))).eq(name.to_lowercase()),
        )
        .one(conn)
        .await
        .map_err(Into::into)
}

/// Creates a new software entry, validating that the name is non-empty.
pub async fn create_software(
    db: &DatabaseConnection,
    name: String,
    requires_license: bool,
    search_by_version: bool,
) -> Result<software::Model> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Software name cannot be empty".to_string(),
        });
    }

    let now = chrono::Utc::now();
    let software = software::ActiveModel {
        name: Set(name.trim().to_string()),
        requires_license: Set(requires_license),
        search_by_version: Set(search_by_version),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    software.insert(db).await.map_err(Into::into)
}

/// Updates an existing software entry's name and flags.
pub async fn update_software(
    db: &DatabaseConnection,
    id: i64,
    name: String,
    requires_license: bool,
    search_by_version: bool,
) -> Result<software::Model> {
    if name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Software name cannot be empty".to_string(),
        });
    }

    let software = Software::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::SoftwareNotFound {
            name: id.to_string(),
        })?;

    let mut active: software::ActiveModel = software.into();
    active.name = Set(name.trim().to_string());
    active.requires_license = Set(requires_license);
    active.search_by_version = Set(search_by_version);
    active.updated_at = Set(chrono::Utc::now());

    active.update(db).await.map_err(Into::into)
}

/// Deletes a software entry by ID.
pub async fn delete_software(db: &DatabaseConnection, id: i64) -> Result<()> {
    let software = Software::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::SoftwareNotFound {
            name: id.to_string(),
        })?;

    software.delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_software_validation() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_software(&db, String::new(), true, false).await;
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err(),
            Error::Validation { message: _ }
        ));

        let result = create_software(&db, "   ".to_string(), true, false).await;
        assert!(result.is_err());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_software_trims_name() -> Result<()> {
        let db = setup_test_db().await?;

        let software = create_software(&db, "  Tool  ".to_string(), true, false).await?;
        assert_eq!(software.name, "Tool");
        assert!(software.requires_license);
        assert!(!software.search_by_version);

        Ok(())
    }

    #[tokio::test]
    async fn test_find_software_by_name_case_insensitive() -> Result<()> {
        let db = setup_test_db().await?;
        let created = create_test_software(&db, "PhotoSuite").await?;

        let found = find_software_by_name(&db, "photosuite").await?;
        assert_eq!(found.unwrap().id, created.id);

        let found = find_software_by_name(&db, "PHOTOSUITE").await?;
        assert_eq!(found.unwrap().id, created.id);

        let not_found = find_software_by_name(&db, "otherware").await?;
        assert!(not_found.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_software_ordered() -> Result<()> {
        let db = setup_test_db().await?;
        create_test_software(&db, "Zeta").await?;
        create_test_software(&db, "Alpha").await?;

        let all = list_software(&db).await?;
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Alpha");
        assert_eq!(all[1].name, "Zeta");

        Ok(())
    }

    #[tokio::test]
    async fn test_update_software() -> Result<()> {
        let db = setup_test_db().await?;
        let software = create_test_software(&db, "Tool").await?;

        let updated = update_software(&db, software.id, "Tool Pro".to_string(), true, true).await?;
        assert_eq!(updated.name, "Tool Pro");
        assert!(updated.search_by_version);

        let missing = update_software(&db, 999, "X".to_string(), true, false).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::SoftwareNotFound { name: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_software() -> Result<()> {
        let db = setup_test_db().await?;
        let software = create_test_software(&db, "Tool").await?;

        delete_software(&db, software.id).await?;
        assert!(get_software(&db, software.id).await?.is_none());

        let missing = delete_software(&db, software.id).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::SoftwareNotFound { name: _ }
        ));

        Ok(())
    }
}
