use crate::handlers::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    entities::order::OrderStatus,
    errors::ApiError,
    services::orders::{CreateOrderInput, OrderResponse},
    AppState,
};
use axum::{
    extract::{Json, Path, State},
    routing::{get, post, put},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Creates the router for order endpoints
pub fn orders_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{owner_id}", post(create_order))
        .route("/{owner_id}", get(get_order_history))
        .route("/{owner_id}/{order_id}", get(get_order_details))
        .route("/{owner_id}/{order_id}/status", put(update_order_status))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderEnvelope {
    pub order: OrderResponse,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}

/// Place an order from the owner's current cart
async fn create_order(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
    Json(payload): Json<CreateOrderInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let order = state
        .services
        .orders
        .create_order(&owner_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(OrderEnvelope { order }))
}

/// List the owner's orders, newest first
async fn get_order_history(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let orders = state
        .services
        .orders
        .get_order_history(&owner_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(orders))
}

/// Load one order with its item snapshot
async fn get_order_details(
    State(state): State<Arc<AppState>>,
    Path((owner_id, order_id)): Path<(String, Uuid)>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .get_order_details(&owner_id, order_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}

/// Move an order to a new status
async fn update_order_status(
    State(state): State<Arc<AppState>>,
    Path((owner_id, order_id)): Path<(String, Uuid)>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .update_order_status(&owner_id, order_id, payload.status)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(order))
}
