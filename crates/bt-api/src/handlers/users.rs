//! User API handlers

use axum::{extract::State, http::StatusCode, Json};
use bt_contracts::signup::SignupData;
use bt_core::error::TrackerError;
use bt_models::{User, UserPreferences};
use bt_services::{SignupService, UpdatePreferencesService};

use crate::error::ApiResult;
use crate::extractors::{ApiJson, AppState, AuthenticatedUser};

async fn load_profile(state: &AppState, user: &AuthenticatedUser) -> ApiResult<User> {
    let profile = state
        .store
        .find_user(&user.id)
        .await
        .map_err(TrackerError::from)?
        .ok_or_else(|| TrackerError::not_found("user", "id", user.id.clone()))?;
    Ok(profile)
}

/// POST /api/users
///
/// Employers open accounts of any role; the form is the signup form.
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(data): ApiJson<SignupData>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let created = SignupService::new(state.store.as_ref(), state.config.auth.password_min_length)
        .invited_by(&user.user)
        .call(data)
        .await
        .into_result()?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/users/me
pub async fn me(State(state): State<AppState>, user: AuthenticatedUser) -> ApiResult<Json<User>> {
    Ok(Json(load_profile(&state, &user).await?))
}

/// GET /api/users/me/preferences
pub async fn get_preferences(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<UserPreferences>> {
    Ok(Json(load_profile(&state, &user).await?.preferences))
}

/// PUT /api/users/me/preferences
pub async fn update_preferences(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    ApiJson(preferences): ApiJson<UserPreferences>,
) -> ApiResult<Json<UserPreferences>> {
    let updated = UpdatePreferencesService::new(state.context(&user))
        .call(preferences)
        .await
        .into_result()?;
    Ok(Json(updated.preferences))
}
