//! Category endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use notevault_core::{Category, CategoryRequest};

use super::{not_found_as_detail, not_found_as_message};
use crate::{ApiError, AppState, CurrentUser};

pub async fn list_categories(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Category>>, ApiError> {
    Ok(Json(state.db.categories.list(user.id).await?))
}

pub async fn create_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let category = state
        .db
        .categories
        .create(user.id, req.title.as_deref().unwrap_or(""))
        .await?;
    Ok((StatusCode::CREATED, Json(category)))
}

/// Existence is checked before ownership: an unknown id is a 404 while a
/// foreign one is a 403. That asymmetry is observable and load-bearing.
pub async fn update_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(category_id): Path<Uuid>,
    Json(req): Json<CategoryRequest>,
) -> Result<Json<Category>, ApiError> {
    let category = state
        .db
        .categories
        .update(user.id, category_id, req.title.as_deref().unwrap_or(""))
        .await
        .map_err(not_found_as_detail)?;
    Ok(Json(category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let notes_deleted = state
        .db
        .categories
        .delete(user.id, category_id)
        .await
        .map_err(not_found_as_message)?;

    info!(
        subsystem = "categories",
        category_id = %category_id,
        notes_deleted,
        "Category deleted"
    );

    Ok(Json(json!({
        "message": "Category and associated notes deleted successfully"
    })))
}
