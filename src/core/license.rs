//! License pool business logic - Handles the scarce pool of license keys.
//!
//! The pool is the only shared mutable resource in the service. It is
//! mutated exclusively inside the fulfillment and deletion transactions
//! (via [`claim_licenses`] and the release logic in `core::order`), and read
//! without locks by the advisory availability queries. No pool state is ever
//! cached in-process.

use crate::{
    entities::{License, Software, SoftwareVersion, license},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use std::collections::HashSet;

/// Counts unused license keys, optionally scoped to a software entry and/or
/// a specific version.
///
/// This count is advisory only: the authoritative check happens under lock
/// at reservation time, so a count observed here is not guaranteed to still
/// hold when a reservation runs.
pub async fn count_available(
    db: &DatabaseConnection,
    software_id: Option<i64>,
    software_version_id: Option<i64>,
) -> Result<u64> {
    let mut query = License::find().filter(license::Column::IsActive.eq(false));

    if let Some(software_id) = software_id {
        query = query.filter(license::Column::SoftwareId.eq(software_id));
    }
    if let Some(version_id) = software_version_id {
        query = query.filter(license::Column::SoftwareVersionId.eq(version_id));
    }

    query.count(db).await.map_err(Into::into)
}

/// Lists unused license keys, optionally scoped to a software entry.
pub async fn list_available(
    db: &DatabaseConnection,
    software_id: Option<i64>,
    limit: Option<u64>,
) -> Result<Vec<license::Model>> {
    let mut query = License::find()
        .filter(license::Column::IsActive.eq(false))
        .order_by_asc(license::Column::Id);

    if let Some(software_id) = software_id {
        query = query.filter(license::Column::SoftwareId.eq(software_id));
    }
    if let Some(limit) = limit {
        query = query.limit(limit);
    }

    query.all(db).await.map_err(Into::into)
}

/// Retrieves a license row by its unique ID.
pub async fn get_license(db: &DatabaseConnection, id: i64) -> Result<Option<license::Model>> {
    License::find_by_id(id).one(db).await.map_err(Into::into)
}

/// Claims exactly `quantity` unused license keys for a software entry,
/// marking them consumed.
///
/// Candidate rows are selected with an exclusive row lock in ascending-id
/// order. The stable order keeps two concurrent reservations from taking
/// overlapping candidate sets in reversed lock order; the lock itself is
/// what guarantees at-most-once allocation per key. Engines without row
/// locks (sqlite) serialize writing transactions instead.
///
/// Must be called inside an open transaction; if the caller rolls back,
/// every mutation made here is discarded.
///
/// # Errors
/// Returns [`Error::InsufficientStock`] before mutating anything when fewer
/// than `quantity` keys are available in the requested scope.
pub(crate) async fn claim_licenses<C>(
    conn: &C,
    software_id: i64,
    software_version_id: Option<i64>,
    quantity: u32,
) -> Result<Vec<license::Model>>
where
    C: ConnectionTrait,
{
    let mut query = License::find()
        .filter(license::Column::SoftwareId.eq(software_id))
        .filter(license::Column::IsActive.eq(false));

    if let Some(version_id) = software_version_id {
        query = query.filter(license::Column::SoftwareVersionId.eq(version_id));
    }

    let candidates = query
        .order_by_asc(license::Column::Id)
        .limit(u64::from(quantity))
        .lock_exclusive()
        .all(conn)
        .await?;

    if (candidates.len() as u64) < u64::from(quantity) {
        return Err(Error::InsufficientStock {
            requested: u64::from(quantity),
            available: candidates.len() as u64,
        });
    }

    let now = chrono::Utc::now();
    let mut claimed = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let mut active: license::ActiveModel = candidate.into();
        active.is_active = Set(true);
        active.used_at = Set(Some(now));
        active.updated_at = Set(now);
        claimed.push(active.update(conn).await?);
    }

    Ok(claimed)
}

/// Bulk-imports license keys for a software entry, skipping keys that
/// already exist.
///
/// Validates that the software exists and draws from the license pool, and
/// that a valid version is supplied when the software's pool is
/// version-scoped. The existing-key check and the insert run in one
/// transaction so a concurrent import cannot slip a duplicate in between;
/// the uniqueness constraint on `license_key` backstops the rest.
///
/// Returns the newly created license rows (an empty vec if every key was
/// already present).
pub async fn import_licenses(
    db: &DatabaseConnection,
    software_id: i64,
    software_version_id: Option<i64>,
    keys: Vec<String>,
) -> Result<Vec<license::Model>> {
    let mut seen = HashSet::new();
    let keys: Vec<String> = keys
        .into_iter()
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty() && seen.insert(key.clone()))
        .collect();

    if keys.is_empty() {
        return Err(Error::Validation {
            message: "license_keys must be a non-empty list of keys".to_string(),
        });
    }

    let txn = db.begin().await?;

    let software = Software::find_by_id(software_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::SoftwareNotFound {
            name: software_id.to_string(),
        })?;

    if !software.requires_license {
        return Err(Error::LicenseNotRequired { id: software_id });
    }

    let version_scope = if software.search_by_version {
        let version_id = software_version_id.ok_or_else(|| Error::Validation {
            message: "software_version_id is required for version-scoped software".to_string(),
        })?;
        SoftwareVersion::find_by_id(version_id)
            .one(&txn)
            .await?
            .ok_or_else(|| Error::VersionNotFound {
                name: version_id.to_string(),
            })?;
        Some(version_id)
    } else {
        None
    };

    let existing: HashSet<String> = License::find()
        .filter(license::Column::SoftwareId.eq(software_id))
        .filter(license::Column::LicenseKey.is_in(keys.clone()))
        .all(&txn)
        .await?
        .into_iter()
        .map(|license| license.license_key)
        .collect();

    let now = chrono::Utc::now();
    let fresh_keys: Vec<String> = keys
        .into_iter()
        .filter(|key| !existing.contains(key))
        .collect();

    if fresh_keys.is_empty() {
        txn.commit().await?;
        return Ok(Vec::new());
    }

    let models: Vec<license::ActiveModel> = fresh_keys
        .iter()
        .map(|key| license::ActiveModel {
            software_id: Set(software_id),
            software_version_id: Set(version_scope),
            license_key: Set(key.clone()),
            is_active: Set(false),
            used_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        })
        .collect();

    License::insert_many(models).exec_without_returning(&txn).await?;

    let inserted = License::find()
        .filter(license::Column::SoftwareId.eq(software_id))
        .filter(license::Column::LicenseKey.is_in(fresh_keys))
        .order_by_asc(license::Column::Id)
        .all(&txn)
        .await?;

    txn.commit().await?;
    Ok(inserted)
}

/// Manually marks a single license key as consumed.
pub async fn activate_license(db: &DatabaseConnection, id: i64) -> Result<license::Model> {
    let license = License::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::LicenseNotFound { id })?;

    if license.is_active {
        return Err(Error::LicenseAlreadyUsed { id });
    }

    let now = chrono::Utc::now();
    let mut active: license::ActiveModel = license.into();
    active.is_active = Set(true);
    active.used_at = Set(Some(now));
    active.updated_at = Set(now);

    active.update(db).await.map_err(Into::into)
}

/// Deletes a license row by ID.
pub async fn delete_license(db: &DatabaseConnection, id: i64) -> Result<()> {
    let license = License::find_by_id(id)
        .one(db)
        .await?
        .ok_or(Error::LicenseNotFound { id })?;

    license.delete(db).await?;
    Ok(())
}

/// Deletes every license row whose key appears in `keys`.
/// Returns the number of rows removed.
pub async fn delete_licenses_by_key(db: &DatabaseConnection, keys: &[String]) -> Result<u64> {
    if keys.is_empty() {
        return Err(Error::Validation {
            message: "No license keys provided for deletion".to_string(),
        });
    }

    let result = License::delete_many()
        .filter(license::Column::LicenseKey.is_in(keys.to_vec()))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::TransactionTrait;

    #[tokio::test]
    async fn test_import_licenses_creates_unused_rows() -> Result<()> {
        let (db, software) = setup_with_software().await?;

        let imported = import_licenses(
            &db,
            software.id,
            None,
            vec!["AAA-111".to_string(), "BBB-222".to_string()],
        )
        .await?;

        assert_eq!(imported.len(), 2);
        assert!(imported.iter().all(|license| !license.is_active));
        assert!(imported.iter().all(|license| license.used_at.is_none()));
        assert_eq!(count_available(&db, Some(software.id), None).await?, 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_import_licenses_skips_existing_keys() -> Result<()> {
        let (db, software) = setup_with_software().await?;

        import_licenses(
            &db,
            software.id,
            None,
            vec!["AAA-111".to_string(), "BBB-222".to_string()],
        )
        .await?;

        let second = import_licenses(
            &db,
            software.id,
            None,
            vec!["BBB-222".to_string(), "CCC-333".to_string()],
        )
        .await?;

        assert_eq!(second.len(), 1);
        assert_eq!(second[0].license_key, "CCC-333");
        assert_eq!(count_available(&db, Some(software.id), None).await?, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_import_licenses_rejects_empty_and_blank_lists() -> Result<()> {
        let (db, software) = setup_with_software().await?;

        let empty = import_licenses(&db, software.id, None, Vec::new()).await;
        assert!(matches!(empty.unwrap_err(), Error::Validation { message: _ }));

        let blank = import_licenses(&db, software.id, None, vec!["  ".to_string()]).await;
        assert!(matches!(blank.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_import_licenses_unknown_software() -> Result<()> {
        let db = setup_test_db().await?;

        let result = import_licenses(&db, 999, None, vec!["AAA-111".to_string()]).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::SoftwareNotFound { name: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_import_licenses_rejects_unlicensed_software() -> Result<()> {
        let db = setup_test_db().await?;
        let software = create_custom_software(&db, "Freeware", false, false).await?;

        let result = import_licenses(&db, software.id, None, vec!["AAA-111".to_string()]).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::LicenseNotRequired { id: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_import_licenses_version_scoped_requires_version() -> Result<()> {
        let db = setup_test_db().await?;
        let software = create_custom_software(&db, "Tool", true, true).await?;

        let missing = import_licenses(&db, software.id, None, vec!["AAA-111".to_string()]).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::Validation { message: _ }
        ));

        let bad_version =
            import_licenses(&db, software.id, Some(999), vec!["AAA-111".to_string()]).await;
        assert!(matches!(
            bad_version.unwrap_err(),
            Error::VersionNotFound { name: _ }
        ));

        let version = create_test_version(&db, software.id, Some("windows"), Some("1.0"), None)
            .await?;
        let imported =
            import_licenses(&db, software.id, Some(version.id), vec!["AAA-111".to_string()])
                .await?;
        assert_eq!(imported[0].software_version_id, Some(version.id));

        Ok(())
    }

    #[tokio::test]
    async fn test_count_available_scoping() -> Result<()> {
        let (db, software) = setup_with_software().await?;
        let other = create_test_software(&db, "Other").await?;
        seed_test_licenses(&db, software.id, None, &["A-1", "A-2"]).await?;
        seed_test_licenses(&db, other.id, None, &["B-1"]).await?;

        assert_eq!(count_available(&db, None, None).await?, 3);
        assert_eq!(count_available(&db, Some(software.id), None).await?, 2);
        assert_eq!(count_available(&db, Some(other.id), None).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_claim_licenses_marks_rows_used_in_id_order() -> Result<()> {
        let (db, software) = setup_with_software().await?;
        let seeded = seed_test_licenses(&db, software.id, None, &["A-1", "A-2", "A-3"]).await?;

        let txn = db.begin().await?;
        let claimed = claim_licenses(&txn, software.id, None, 2).await?;
        txn.commit().await?;

        assert_eq!(claimed.len(), 2);
        assert_eq!(claimed[0].id, seeded[0].id);
        assert_eq!(claimed[1].id, seeded[1].id);
        assert!(claimed.iter().all(|license| license.is_active));
        assert!(claimed.iter().all(|license| license.used_at.is_some()));
        assert_eq!(count_available(&db, Some(software.id), None).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_claim_licenses_insufficient_before_mutation() -> Result<()> {
        let (db, software) = setup_with_software().await?;
        seed_test_licenses(&db, software.id, None, &["A-1"]).await?;

        let txn = db.begin().await?;
        let result = claim_licenses(&txn, software.id, None, 2).await;
        txn.commit().await?;

        assert!(matches!(
            result.unwrap_err(),
            Error::InsufficientStock {
                requested: 2,
                available: 1
            }
        ));
        // The short claim must not have consumed the one remaining key.
        assert_eq!(count_available(&db, Some(software.id), None).await?, 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_claim_licenses_rolls_back_with_transaction() -> Result<()> {
        let (db, software) = setup_with_software().await?;
        seed_test_licenses(&db, software.id, None, &["A-1", "A-2", "A-3"]).await?;

        // Simulate a failure after the claim step: the transaction is
        // dropped without commit, so every mutation must be discarded.
        {
            let txn = db.begin().await?;
            let claimed = claim_licenses(&txn, software.id, None, 2).await?;
            assert_eq!(claimed.len(), 2);
            drop(txn);
        }

        assert_eq!(count_available(&db, Some(software.id), None).await?, 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_activate_license() -> Result<()> {
        let (db, software) = setup_with_software().await?;
        let seeded = seed_test_licenses(&db, software.id, None, &["A-1"]).await?;

        let activated = activate_license(&db, seeded[0].id).await?;
        assert!(activated.is_active);
        assert!(activated.used_at.is_some());

        let again = activate_license(&db, seeded[0].id).await;
        assert!(matches!(
            again.unwrap_err(),
            Error::LicenseAlreadyUsed { id: _ }
        ));

        let missing = activate_license(&db, 999).await;
        assert!(matches!(
            missing.unwrap_err(),
            Error::LicenseNotFound { id: 999 }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_licenses_by_key() -> Result<()> {
        let (db, software) = setup_with_software().await?;
        seed_test_licenses(&db, software.id, None, &["A-1", "A-2", "A-3"]).await?;

        let removed =
            delete_licenses_by_key(&db, &["A-1".to_string(), "A-3".to_string()]).await?;
        assert_eq!(removed, 2);
        assert_eq!(count_available(&db, Some(software.id), None).await?, 1);

        let none = delete_licenses_by_key(&db, &[]).await;
        assert!(matches!(none.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }
}
