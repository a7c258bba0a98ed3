//! Software catalog API handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete as delete_route, get},
};
use serde::Deserialize;

use crate::api::{AppState, MessageResponse};
use crate::core::{software, version};
use crate::entities::{software as software_entity, software_version};
use crate::errors::{Error, Result};

/// Software catalog routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/software", get(list).post(create))
        .route(
            "/software/{id}",
            get(get_by_id).put(update).delete(delete),
        )
        .route(
            "/software/{id}/versions",
            get(list_versions).post(create_version),
        )
        .route("/versions/{id}", delete_route(delete_version))
}

/// Body of software create/update requests
#[derive(Debug, Deserialize)]
pub struct SoftwareBody {
    /// Product name
    pub name: String,
    /// Whether fulfillment draws from the license pool
    #[serde(default)]
    pub requires_license: bool,
    /// Whether the pool is scoped per version
    #[serde(default)]
    pub search_by_version: bool,
}

/// Body of version create requests
#[derive(Debug, Deserialize)]
pub struct VersionBody {
    /// Operating system label
    pub os: Option<String>,
    /// Version label
    pub version: Option<String>,
    /// Direct download link
    pub download_link: Option<String>,
}

/// GET /software - list the catalog
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<software_entity::Model>>> {
    Ok(Json(software::list_software(&state.db).await?))
}

/// GET /software/:id - fetch one entry
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<software_entity::Model>> {
    let entry = software::get_software(&state.db, id)
        .await?
        .ok_or_else(|| Error::SoftwareNotFound {
            name: id.to_string(),
        })?;
    Ok(Json(entry))
}

/// POST /software - create an entry
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<SoftwareBody>,
) -> Result<Json<software_entity::Model>> {
    let created = software::create_software(
        &state.db,
        body.name,
        body.requires_license,
        body.search_by_version,
    )
    .await?;
    Ok(Json(created))
}

/// PUT /software/:id - update an entry
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<SoftwareBody>,
) -> Result<Json<software_entity::Model>> {
    let updated = software::update_software(
        &state.db,
        id,
        body.name,
        body.requires_license,
        body.search_by_version,
    )
    .await?;
    Ok(Json(updated))
}

/// DELETE /software/:id - remove an entry
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    software::delete_software(&state.db, id).await?;
    Ok(Json(MessageResponse {
        message: "Software deleted".to_string(),
    }))
}

/// GET /software/:id/versions - list versions of an entry
pub async fn list_versions(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<software_version::Model>>> {
    Ok(Json(version::list_versions(&state.db, id).await?))
}

/// POST /software/:id/versions - add a version
pub async fn create_version(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<VersionBody>,
) -> Result<Json<software_version::Model>> {
    let created =
        version::create_version(&state.db, id, body.os, body.version, body.download_link).await?;
    Ok(Json(created))
}

/// DELETE /versions/:id - remove a version
pub async fn delete_version(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    version::delete_version(&state.db, id).await?;
    Ok(Json(MessageResponse {
        message: "Software version deleted".to_string(),
    }))
}
