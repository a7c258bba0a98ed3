//! Order API handlers.
//!
//! `POST /orders/find` is the storefront fulfillment path with the full
//! branching policy; `POST /orders/process` is the simplified hard-failing
//! variant. Both return 200 bodies whose `licenses` field distinguishes
//! full success from the degraded link-only path.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use crate::api::{AppState, MessageResponse};
use crate::core::order::{self, FulfillmentOutcome, FulfillmentRequest};
use crate::entities::order as order_entity;
use crate::errors::Result;

/// Order routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list))
        .route("/orders/find", post(find))
        .route("/orders/process", post(process))
        .route("/orders/{id}", get(get_by_id).delete(delete))
}

/// Body of `POST /orders/find`
#[derive(Debug, Deserialize)]
pub struct FindOrderBody {
    /// Business-facing order reference
    pub order_id: String,
    /// Product name
    pub item_name: String,
    /// Operating system selector
    pub os: Option<String>,
    /// Version selector
    pub version: Option<String>,
    /// Number of license keys requested
    pub item_amount: u32,
    /// User placing the order
    pub user_id: Option<String>,
}

/// Body of `POST /orders/process`
#[derive(Debug, Deserialize)]
pub struct ProcessOrderBody {
    /// Business-facing order reference
    pub order_id: String,
    /// Product name
    pub item_name: String,
    /// Operating system selector
    pub os: Option<String>,
    /// Version selector
    pub version: Option<String>,
    /// Number of license keys requested
    pub license_count: u32,
    /// User placing the order
    pub user_id: Option<String>,
}

/// Response of `POST /orders/find`
#[derive(Debug, Serialize)]
pub struct FindOrderResponse {
    /// Human-readable outcome description
    pub message: String,
    /// Resolved product name
    pub item: String,
    /// Business order reference, present only when an order was recorded
    pub order_id: Option<String>,
    /// Download link, when the resolved version carries one
    pub download_link: Option<String>,
    /// Claimed license keys; empty on every non-fulfilled outcome
    pub licenses: Vec<String>,
}

/// Response of `POST /orders/process`
#[derive(Debug, Serialize)]
pub struct ProcessOrderResponse {
    /// Human-readable outcome description
    pub message: String,
    /// Business order reference
    pub order_id: String,
    /// Download link, when the resolved version carries one
    pub download_link: Option<String>,
    /// Claimed license keys
    pub license_keys: Vec<String>,
}

/// An order with the license keys it claimed.
#[derive(Debug, Serialize)]
pub struct OrderWithLicenses {
    /// The order row
    #[serde(flatten)]
    pub order: order_entity::Model,
    /// Keys granted to this order
    pub licenses: Vec<String>,
}

/// POST /orders/find - fulfill a purchase request
pub async fn find(
    State(state): State<AppState>,
    Json(body): Json<FindOrderBody>,
) -> Result<Json<FindOrderResponse>> {
    let outcome = order::fulfill_order(
        &state.db,
        FulfillmentRequest {
            order_id: body.order_id,
            item_name: body.item_name,
            os: body.os,
            version: body.version,
            quantity: body.item_amount,
            user_id: body.user_id,
        },
    )
    .await?;

    let response = match outcome {
        FulfillmentOutcome::Fulfilled {
            item,
            order,
            download_link,
            license_keys,
        } => FindOrderResponse {
            message: "Order found and processed".to_string(),
            item,
            order_id: Some(order.order_id),
            download_link,
            licenses: license_keys,
        },
        FulfillmentOutcome::LicenseFree {
            item,
            download_link,
        } => FindOrderResponse {
            message: "Order found and processed".to_string(),
            item,
            order_id: None,
            download_link,
            licenses: Vec::new(),
        },
        FulfillmentOutcome::VersionNotFound { item } => FindOrderResponse {
            message: "Software version not found".to_string(),
            item,
            order_id: None,
            download_link: None,
            licenses: Vec::new(),
        },
        FulfillmentOutcome::LinkOnly {
            item,
            download_link,
        } => FindOrderResponse {
            message: "License stock unavailable, download link provided".to_string(),
            item,
            order_id: None,
            download_link: Some(download_link),
            licenses: Vec::new(),
        },
    };

    Ok(Json(response))
}

/// POST /orders/process - simplified fulfillment
pub async fn process(
    State(state): State<AppState>,
    Json(body): Json<ProcessOrderBody>,
) -> Result<Json<ProcessOrderResponse>> {
    let processed = order::process_order(
        &state.db,
        FulfillmentRequest {
            order_id: body.order_id,
            item_name: body.item_name,
            os: body.os,
            version: body.version,
            quantity: body.license_count,
            user_id: body.user_id,
        },
    )
    .await?;

    Ok(Json(ProcessOrderResponse {
        message: "Order processed".to_string(),
        order_id: processed.order.order_id,
        download_link: processed.download_link,
        license_keys: processed.license_keys,
    }))
}

/// GET /orders - list all orders with their license keys
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<OrderWithLicenses>>> {
    let orders = order::list_orders(&state.db).await?;

    Ok(Json(
        orders
            .into_iter()
            .map(|(order, licenses)| OrderWithLicenses {
                order,
                licenses: licenses
                    .into_iter()
                    .map(|license| license.license_key)
                    .collect(),
            })
            .collect(),
    ))
}

/// GET /orders/:id - fetch a single order
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<OrderWithLicenses>> {
    let (order, licenses) = order::get_order(&state.db, id)
        .await?
        .ok_or(crate::errors::Error::OrderNotFound { id })?;

    Ok(Json(OrderWithLicenses {
        order,
        licenses: licenses
            .into_iter()
            .map(|license| license.license_key)
            .collect(),
    }))
}

/// DELETE /orders/:id - delete an order and release its licenses
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>> {
    order::delete_order(&state.db, id, None).await?;

    Ok(Json(MessageResponse {
        message: "Order deleted and licenses released".to_string(),
    }))
}
