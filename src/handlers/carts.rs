use crate::handlers::common::{map_service_error, success_response, validate_input};
use crate::{errors::ApiError, services::carts::AddItemInput, AppState};
use axum::{
    extract::{Json, Path, State},
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

/// Creates the router for cart endpoints
pub fn carts_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/{owner_id}", get(get_cart))
        .route("/{owner_id}", post(add_to_cart))
        .route("/{owner_id}", delete(clear_cart))
        .route("/{owner_id}/item/{item_id}", put(update_cart_item))
        .route("/{owner_id}/item/{item_id}", delete(remove_cart_item))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuantityRequest {
    #[validate(range(min = 1))]
    pub quantity: i32,
}

/// Get the owner's cart, creating an empty one on first access
async fn get_cart(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .carts
        .get_or_create_cart(&owner_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}

/// Add an item to the owner's cart
async fn add_to_cart(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
    Json(payload): Json<AddItemInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let cart = state
        .services
        .carts
        .add_item(&owner_id, payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}

/// Update the quantity of one cart line
async fn update_cart_item(
    State(state): State<Arc<AppState>>,
    Path((owner_id, item_id)): Path<(String, String)>,
    Json(payload): Json<UpdateQuantityRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let cart = state
        .services
        .carts
        .update_item_quantity(&owner_id, &item_id, payload.quantity)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}

/// Remove one line from the cart
async fn remove_cart_item(
    State(state): State<Arc<AppState>>,
    Path((owner_id, item_id)): Path<(String, String)>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .carts
        .remove_item(&owner_id, &item_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}

/// Delete every item from the cart
async fn clear_cart(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .carts
        .clear_cart(&owner_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(cart))
}
