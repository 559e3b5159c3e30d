use crate::handlers::common::{map_service_error, success_response, validate_input};
use crate::{errors::ApiError, services::preferences::SavePreferencesInput, AppState};
use axum::{
    extract::{Json, Path, State},
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Creates the router for user preference endpoints
pub fn preferences_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/preferences", post(save_preferences))
        .route("/preferences/{owner_id}", get(get_preferences))
        .route("/preferences/check/{owner_id}", get(check_preferences))
}

/// Create or replace the owner's preference profile
async fn save_preferences(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SavePreferencesInput>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let preferences = state
        .services
        .preferences
        .save_preferences(payload)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(preferences))
}

/// Load the owner's preference profile
async fn get_preferences(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let preferences = state
        .services
        .preferences
        .get_preferences(&owner_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(preferences))
}

/// Report whether the owner has completed the preference flow
async fn check_preferences(
    State(state): State<Arc<AppState>>,
    Path(owner_id): Path<String>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let check = state
        .services
        .preferences
        .check_preferences(&owner_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(check))
}
