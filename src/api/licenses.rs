//! License pool API handlers.
//!
//! Availability endpoints are advisory reads for the storefront and admin
//! UI; the authoritative stock check always happens under lock inside the
//! fulfillment transaction.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use serde::{Deserialize, Serialize};

use crate::api::{AppState, MessageResponse};
use crate::core::license;
use crate::entities::license as license_entity;
use crate::errors::{Error, Result};

/// License routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/licenses/available", get(list_available))
        .route("/licenses/available/count", get(count_available))
        .route("/licenses/bulk", post(import))
        .route("/licenses/delete-multiple", post(delete_multiple))
        .route("/licenses/{id}", get(get_by_id).delete(delete))
        .route("/licenses/{id}/activate", patch(activate))
}

/// Query parameters for availability endpoints
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// Restrict to one software entry
    pub software_id: Option<i64>,
    /// Restrict to one version of that software
    pub software_version_id: Option<i64>,
    /// Cap the number of rows returned
    pub limit: Option<u64>,
}

/// Body of `POST /licenses/bulk`
#[derive(Debug, Deserialize)]
pub struct ImportBody {
    /// Software the keys belong to
    pub software_id: i64,
    /// Version scope, required when the software is version-scoped
    pub software_version_id: Option<i64>,
    /// The keys to import
    pub license_keys: Vec<String>,
}

/// Body of `POST /licenses/delete-multiple`
#[derive(Debug, Deserialize)]
pub struct DeleteMultipleBody {
    /// Key strings to remove from the pool
    pub licenses: Vec<String>,
}

/// Response of `POST /licenses/bulk`
#[derive(Debug, Serialize)]
pub struct ImportResponse {
    /// Human-readable confirmation
    pub message: String,
    /// The newly created license rows
    pub licenses: Vec<license_entity::Model>,
}

/// Response of `GET /licenses/available/count`
#[derive(Debug, Serialize)]
pub struct AvailableCountResponse {
    /// Number of unused keys in the requested scope
    pub available: u64,
}

/// GET /licenses/available - list unused license keys
pub async fn list_available(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<license_entity::Model>>> {
    let licenses = license::list_available(&state.db, query.software_id, query.limit).await?;
    Ok(Json(licenses))
}

/// GET /licenses/available/count - count unused license keys
pub async fn count_available(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailableCountResponse>> {
    let available =
        license::count_available(&state.db, query.software_id, query.software_version_id).await?;
    Ok(Json(AvailableCountResponse { available }))
}

/// GET /licenses/:id - fetch a single license row
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<license_entity::Model>> {
    let license = license::get_license(&state.db, id)
        .await?
        .ok_or(Error::LicenseNotFound { id })?;
    Ok(Json(license))
}

/// POST /licenses/bulk - import license keys
pub async fn import(
    State(state): State<AppState>,
    Json(body): Json<ImportBody>,
) -> Result<Json<ImportResponse>> {
    let imported = license::import_licenses(
        &state.db,
        body.software_id,
        body.software_version_id,
        body.license_keys,
    )
    .await?;

    Ok(Json(ImportResponse {
        message: format!("{} licenses imported", imported.len()),
        licenses: imported,
    }))
}

/// PATCH /licenses/:id/activate - manually mark a key consumed
pub async fn activate(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<license_entity::Model>> {
    let license = license::activate_license(&state.db, id).await?;
    Ok(Json(license))
}

/// DELETE /licenses/:id - remove a key from the pool
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    license::delete_license(&state.db, id).await?;
    Ok(Json(MessageResponse {
        message: "License deleted".to_string(),
    }))
}

/// POST /licenses/delete-multiple - remove keys by value
pub async fn delete_multiple(
    State(state): State<AppState>,
    Json(body): Json<DeleteMultipleBody>,
) -> Result<Json<MessageResponse>> {
    let removed = license::delete_licenses_by_key(&state.db, &body.licenses).await?;
    Ok(Json(MessageResponse {
        message: format!("{removed} licenses deleted"),
    }))
}
