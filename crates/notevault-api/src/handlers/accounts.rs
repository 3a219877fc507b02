//! Account endpoints: registration, login, token refresh, profile, and the
//! two password-reset flows.

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use notevault_core::{
    LoginRequest, RecoverPasswordRequest, RefreshRequest, RegisterRequest, ResetPasswordRequest,
    UpdateProfileRequest,
};

use crate::{bearer_token, ApiError, AppState, CurrentUser};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let user = state.db.users.register(req).await?;
    let pair = state.tokens.issue_pair(user.id)?;

    info!(subsystem = "accounts", user_id = %user.id, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "User created successfully",
            "access": pair.access,
            "refresh": pair.refresh,
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let user = state
        .db
        .users
        .authenticate(&req.username, &req.password)
        .await?;
    let pair = state.tokens.issue_pair(user.id)?;

    Ok(Json(json!({
        "access": pair.access,
        "refresh": pair.refresh,
    })))
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let access = state.tokens.refresh(&req.refresh)?;
    Ok(Json(json!({ "access": access })))
}

pub async fn profile(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<notevault_core::ProfileResponse>, ApiError> {
    Ok(Json(state.db.users.profile(user.id).await?))
}

pub async fn update_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.users.update_profile(user.id, req).await?;
    // Historical message; the update covers more than the email.
    Ok(Json(json!({ "message": "Email updated successfully" })))
}

pub async fn reset_password(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.users.reset_password(user.id, req).await?;
    info!(subsystem = "accounts", user_id = %user.id, "Password reset");
    Ok(Json(json!({ "message": "Password reset successfully" })))
}

/// Unauthenticated recovery flow: identity is asserted with username+email
/// only. Deliberately weak, kept for wire compatibility.
pub async fn recover_password(
    State(state): State<AppState>,
    Json(req): Json<RecoverPasswordRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state.db.users.recover_password(req).await?;
    Ok(Json(json!({ "message": "Password reset successfully" })))
}

#[derive(Debug, Default, Deserialize)]
pub struct FirstnameQuery {
    pub username: Option<String>,
}

/// Looks up a first name by username, defaulting to the caller.
///
/// Unlike the other authenticated endpoints this one answers 401 with the
/// `error` key, so the token check is done by hand instead of through
/// [`CurrentUser`].
pub async fn get_firstname(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FirstnameQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let token = bearer_token(&headers).ok_or(ApiError::AuthRequired)?;
    let caller_id = state
        .tokens
        .verify_access(token)
        .map_err(|_| ApiError::AuthRequired)?;

    let username = match query.username {
        Some(username) => username,
        None => state.db.users.get(caller_id).await?.username,
    };

    match state.db.users.first_name_of(&username).await? {
        Some(first_name) => Ok(Json(json!({ "first_name": first_name }))),
        None => Err(ApiError::NotFound("User not found".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_firstname_query_username_is_optional() {
        let query: FirstnameQuery = serde_json::from_str("{}").unwrap();
        assert!(query.username.is_none());

        let query: FirstnameQuery = serde_json::from_str(r#"{"username":"ada"}"#).unwrap();
        assert_eq!(query.username.as_deref(), Some("ada"));
    }
}
