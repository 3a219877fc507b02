//! Note endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use notevault_core::{CreateNoteRequest, Note, UpdateNoteRequest};

use super::not_found_as_message;
use crate::{ApiError, AppState, CurrentUser};

pub async fn list_notes(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(state.db.notes.list(user.id).await?))
}

pub async fn create_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), ApiError> {
    let note = state.db.notes.create(user.id, req).await?;
    Ok((StatusCode::CREATED, Json(note)))
}

pub async fn get_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(note_id): Path<Uuid>,
) -> Result<Json<Note>, ApiError> {
    let note = state
        .db
        .notes
        .get(user.id, note_id)
        .await
        .map_err(not_found_as_message)?;
    Ok(Json(note))
}

pub async fn update_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(note_id): Path<Uuid>,
    Json(req): Json<UpdateNoteRequest>,
) -> Result<Json<Note>, ApiError> {
    let note = state
        .db
        .notes
        .update(user.id, note_id, req)
        .await
        .map_err(not_found_as_message)?;
    Ok(Json(note))
}

pub async fn delete_note(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(note_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .db
        .notes
        .delete(user.id, note_id)
        .await
        .map_err(not_found_as_message)?;
    Ok(Json(json!({ "message": "Note deleted successfully" })))
}

/// The category is resolved even when it holds no notes, so an unknown or
/// foreign category id is a 404 rather than an empty list.
pub async fn notes_by_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(category_id): Path<Uuid>,
) -> Result<Json<Vec<Note>>, ApiError> {
    Ok(Json(
        state.db.notes.list_by_category(user.id, category_id).await?,
    ))
}

pub async fn toggle_pin(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(note_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let pinned = state.db.notes.toggle_pin(user.id, note_id).await?;
    Ok(Json(json!({
        "message": "Pin status updated",
        "pinned": pinned,
    })))
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// Only absence and the empty string are rejected. A whitespace-padded
/// query is passed through untrimmed and matched literally.
fn require_query(query: &SearchQuery) -> Result<&str, ApiError> {
    match query.q.as_deref() {
        Some(q) if !q.is_empty() => Ok(q),
        _ => Err(ApiError::BadRequest(
            "Search query parameter `q` is required".to_string(),
        )),
    }
}

pub async fn search_notes(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Note>>, ApiError> {
    let q = require_query(&query)?;
    Ok(Json(state.db.notes.search(user.id, q).await?))
}
