//! Order fulfillment business logic - The reservation engine.
//!
//! Fulfillment claims unused license keys for a product inside a single
//! transaction: resolve the software, resolve the version, lock and mark the
//! candidate keys, record the order, and link the keys to it through the
//! join table. Deletion reverses the whole reservation the same way. Any
//! failure mid-way drops the transaction, which rolls every step back, so a
//! caller never observes a half-allocated order.

use crate::{
    core::{license::claim_licenses, software::find_software_by_name, version::find_version},
    entities::{License, Order, OrderLicense, license, order, order_license},
    errors::{Error, Result},
};
use sea_orm::{Set, TransactionTrait, prelude::*};
use tracing::instrument;

/// Status of an order whose reservation has been committed.
pub const STATUS_PROCESSED: &str = "processed";
/// Status of an order that has been recorded but not fulfilled.
pub const STATUS_PENDING: &str = "pending";

/// A storefront purchase request to be fulfilled from the license pool.
#[derive(Debug, Clone)]
pub struct FulfillmentRequest {
    /// Business-facing order reference
    pub order_id: String,
    /// Product name, matched case-insensitively
    pub item_name: String,
    /// Operating system selector for the version lookup
    pub os: Option<String>,
    /// Version selector for the version lookup
    pub version: Option<String>,
    /// Number of license keys requested
    pub quantity: u32,
    /// User placing the order, if known
    pub user_id: Option<String>,
}

/// Every non-error way a fulfillment attempt can end.
///
/// Only [`FulfillmentOutcome::Fulfilled`] creates an order; the other
/// variants commit no writes at all. Callers distinguish the degraded
/// link-only path from full success by the empty `license_keys`, not by an
/// error code.
#[derive(Debug, Clone, PartialEq)]
pub enum FulfillmentOutcome {
    /// Keys were claimed and an order was recorded
    Fulfilled {
        /// Resolved software name
        item: String,
        /// The order row created for this reservation
        order: order::Model,
        /// Download link of the resolved version, if any
        download_link: Option<String>,
        /// The claimed license key strings
        license_keys: Vec<String>,
    },
    /// The software does not draw from the license pool; no order is created
    LicenseFree {
        /// Resolved software name
        item: String,
        /// Download link of the resolved version, if any
        download_link: Option<String>,
    },
    /// The software requires a version-scoped pool but no version matched
    VersionNotFound {
        /// Resolved software name
        item: String,
    },
    /// Not enough keys, but the version carries a link; nothing is claimed
    LinkOnly {
        /// Resolved software name
        item: String,
        /// The fallback download link handed to the buyer
        download_link: String,
    },
}

/// The result of the simplified `process` fulfillment path.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedOrder {
    /// The order row created for this request
    pub order: order::Model,
    /// Download link of the resolved version, if any
    pub download_link: Option<String>,
    /// The claimed license key strings (empty for license-free software)
    pub license_keys: Vec<String>,
}

/// Fulfills a purchase request, claiming license keys atomically.
///
/// The branching policy is evaluated in a fixed order, each branch a
/// distinct terminal outcome:
/// 1. unknown software fails with [`Error::SoftwareNotFound`];
/// 2. license-free software returns [`FulfillmentOutcome::LicenseFree`]
///    without creating an order;
/// 3. a version-scoped product with no matching version returns
///    [`FulfillmentOutcome::VersionNotFound`];
/// 4. a short pool returns [`FulfillmentOutcome::LinkOnly`] when the version
///    carries a download link, and fails with [`Error::InsufficientStock`]
///    otherwise;
/// 5. otherwise keys are claimed, the order recorded, and join rows written,
///    all in the one transaction opened at the start.
///
/// Two concurrent calls racing for overlapping keys serialize on the locked
/// candidate select inside [`claim_licenses`]; the loser re-evaluates
/// availability and lands in branch 4.
#[instrument(skip(db, request), fields(item = %request.item_name, quantity = request.quantity))]
pub async fn fulfill_order(
    db: &DatabaseConnection,
    request: FulfillmentRequest,
) -> Result<FulfillmentOutcome> {
    if request.quantity < 1 {
        return Err(Error::InvalidQuantity {
            quantity: request.quantity,
        });
    }

    let txn = db.begin().await?;

    let software = find_software_by_name(&txn, &request.item_name)
        .await?
        .ok_or_else(|| Error::SoftwareNotFound {
            name: request.item_name.clone(),
        })?;

    let version = find_version(
        &txn,
        software.id,
        request.os.as_deref(),
        request.version.as_deref(),
    )
    .await?;

    if !software.requires_license {
        txn.commit().await?;
        return Ok(FulfillmentOutcome::LicenseFree {
            item: software.name,
            download_link: version.and_then(|version| version.download_link),
        });
    }

    if software.search_by_version && version.is_none() {
        txn.commit().await?;
        return Ok(FulfillmentOutcome::VersionNotFound {
            item: software.name,
        });
    }

    let version_scope = if software.search_by_version {
        version.as_ref().map(|version| version.id)
    } else {
        None
    };

    let claimed = match claim_licenses(&txn, software.id, version_scope, request.quantity).await {
        Ok(claimed) => claimed,
        Err(err @ Error::InsufficientStock { .. }) => {
            let fallback_link = if software.search_by_version {
                version.as_ref().and_then(|version| version.download_link.clone())
            } else {
                None
            };
            return match fallback_link {
                Some(download_link) => {
                    // Degraded success: nothing was claimed, so there is
                    // nothing to roll back.
                    txn.commit().await?;
                    Ok(FulfillmentOutcome::LinkOnly {
                        item: software.name,
                        download_link,
                    })
                }
                None => Err(err),
            };
        }
        Err(err) => return Err(err),
    };

    let now = chrono::Utc::now();
    let order = order::ActiveModel {
        order_id: Set(request.order_id),
        item_name: Set(request.item_name),
        os: Set(request.os),
        version: Set(request.version),
        license_count: Set(request.quantity as i32),
        status: Set(STATUS_PROCESSED.to_string()),
        software_id: Set(Some(software.id)),
        user_id: Set(request.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let links: Vec<order_license::ActiveModel> = claimed
        .iter()
        .map(|license| order_license::ActiveModel {
            order_id: Set(order.id),
            license_id: Set(license.id),
        })
        .collect();
    OrderLicense::insert_many(links)
        .exec_without_returning(&txn)
        .await?;

    txn.commit().await?;

    let license_keys = claimed
        .into_iter()
        .map(|license| license.license_key)
        .collect();

    Ok(FulfillmentOutcome::Fulfilled {
        item: software.name,
        order,
        download_link: version.and_then(|version| version.download_link),
        license_keys,
    })
}

/// Processes an order through the simplified path.
///
/// Unlike [`fulfill_order`] this path requires the version to exist, has no
/// link-only fallback (a short pool always fails with
/// [`Error::InsufficientStock`]), and records an order even for
/// license-free software. Claim discipline is identical: one transaction,
/// locked candidate select, join rows for every claimed key.
#[instrument(skip(db, request), fields(item = %request.item_name, quantity = request.quantity))]
pub async fn process_order(
    db: &DatabaseConnection,
    request: FulfillmentRequest,
) -> Result<ProcessedOrder> {
    if request.quantity < 1 {
        return Err(Error::InvalidQuantity {
            quantity: request.quantity,
        });
    }

    let txn = db.begin().await?;

    let software = find_software_by_name(&txn, &request.item_name)
        .await?
        .ok_or_else(|| Error::SoftwareNotFound {
            name: request.item_name.clone(),
        })?;

    let version = find_version(
        &txn,
        software.id,
        request.os.as_deref(),
        request.version.as_deref(),
    )
    .await?
    .ok_or_else(|| Error::VersionNotFound {
        name: format!(
            "{}/{}",
            request.os.as_deref().unwrap_or("-"),
            request.version.as_deref().unwrap_or("-")
        ),
    })?;

    let claimed = if software.requires_license {
        let version_scope = software.search_by_version.then_some(version.id);
        claim_licenses(&txn, software.id, version_scope, request.quantity).await?
    } else {
        Vec::new()
    };

    let now = chrono::Utc::now();
    let order = order::ActiveModel {
        order_id: Set(request.order_id),
        item_name: Set(request.item_name),
        os: Set(request.os),
        version: Set(request.version),
        license_count: Set(request.quantity as i32),
        status: Set(STATUS_PROCESSED.to_string()),
        software_id: Set(Some(software.id)),
        user_id: Set(request.user_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    if !claimed.is_empty() {
        let links: Vec<order_license::ActiveModel> = claimed
            .iter()
            .map(|license| order_license::ActiveModel {
                order_id: Set(order.id),
                license_id: Set(license.id),
            })
            .collect();
        OrderLicense::insert_many(links)
            .exec_without_returning(&txn)
            .await?;
    }

    txn.commit().await?;

    let license_keys = claimed
        .into_iter()
        .map(|license| license.license_key)
        .collect();

    Ok(ProcessedOrder {
        order,
        download_link: version.download_link,
        license_keys,
    })
}

/// Deletes an order and releases every license key it had claimed.
///
/// The order and its linked licenses are read inside the same transaction
/// as the writes, so a concurrent reservation cannot observe keys mid
/// release. A `requester` of `None` is an administrative caller; otherwise
/// the requester must match the order's owner.
#[instrument(skip(db))]
pub async fn delete_order(
    db: &DatabaseConnection,
    order_id: i64,
    requester: Option<&str>,
) -> Result<()> {
    let txn = db.begin().await?;

    let mut rows = Order::find_by_id(order_id)
        .find_with_related(License)
        .all(&txn)
        .await?;
    let Some((order, licenses)) = rows.pop() else {
        return Err(Error::OrderNotFound { id: order_id });
    };

    if let Some(requester) = requester {
        if order.user_id.as_deref() != Some(requester) {
            return Err(Error::Forbidden { id: order_id });
        }
    }

    let now = chrono::Utc::now();
    for license in licenses {
        let mut active: license::ActiveModel = license.into();
        active.is_active = Set(false);
        active.used_at = Set(None);
        active.updated_at = Set(now);
        active.update(&txn).await?;
    }

    OrderLicense::delete_many()
        .filter(order_license::Column::OrderId.eq(order_id))
        .exec(&txn)
        .await?;

    order.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Lists all orders, newest first, each with its claimed license keys.
pub async fn list_orders(
    db: &DatabaseConnection,
) -> Result<Vec<(order::Model, Vec<license::Model>)>> {
    let mut rows = Order::find().find_with_related(License).all(db).await?;
    // find_with_related returns rows grouped in ascending primary-key
    // order; reverse for newest-first.
    rows.reverse();
    Ok(rows)
}

/// Retrieves a single order with its claimed license keys.
pub async fn get_order(
    db: &DatabaseConnection,
    order_id: i64,
) -> Result<Option<(order::Model, Vec<license::Model>)>> {
    let mut rows = Order::find_by_id(order_id)
        .find_with_related(License)
        .all(db)
        .await?;
    Ok(rows.pop())
}
