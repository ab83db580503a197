//! Session API handlers

use axum::{
    extract::State,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use bt_auth::CurrentUser;
use bt_contracts::password::{ForgotPasswordData, ResetPasswordData};
use bt_contracts::signup::SignupData;
use bt_core::error::TrackerError;
use bt_models::User;
use bt_services::{ForgotPasswordService, LoginParams, LoginService, ResetPasswordService, SignupService};
use chrono::Duration;
use serde::Serialize;

use crate::error::ApiResult;
use crate::extractors::{request_headers, ApiJson, AppState, AuthenticatedUser};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
    pub user: CurrentUser,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(params): ApiJson<LoginParams>,
) -> ApiResult<impl IntoResponse> {
    let user_agent = request_headers(&headers).user_agent;
    let outcome = LoginService::new(state.store.as_ref(), &state.auth)
        .call(params, user_agent.as_deref())
        .await
        .into_result()?;

    let session_id = outcome.signed_in.session.id.clone();
    let cookie = state.auth.cookie_config().build_cookie(&session_id);
    let body = TokenResponse {
        token: outcome.signed_in.token,
        token_type: "Bearer",
        expires_in: outcome.signed_in.expires_in,
        user: CurrentUser::new(&outcome.user, session_id),
    };

    Ok(([(SET_COOKIE, cookie)], Json(body)))
}

/// POST /api/auth/signup
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<SignupData>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = SignupService::new(state.store.as_ref(), state.config.auth.password_min_length)
        .call(data)
        .await
        .into_result()?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<impl IntoResponse> {
    state
        .auth
        .sign_out(&user.identity)
        .map_err(TrackerError::from)?;

    let cookie = state.auth.cookie_config().build_clear_cookie();
    Ok((StatusCode::NO_CONTENT, [(SET_COOKIE, cookie)]))
}

/// POST /api/auth/password/forgot
///
/// Answers 202 whether or not the address belongs to an account.
pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<ForgotPasswordData>,
) -> ApiResult<(StatusCode, Json<MessageResponse>)> {
    let ttl = Duration::minutes(state.config.auth.reset_token_ttl_minutes as i64);
    ForgotPasswordService::new(state.store.as_ref(), ttl)
        .call(data)
        .await
        .into_result()?;

    Ok((
        StatusCode::ACCEPTED,
        Json(MessageResponse {
            message: "If the address belongs to an account, a reset link is on its way",
        }),
    ))
}

/// POST /api/auth/password/reset
pub async fn reset_password(
    State(state): State<AppState>,
    ApiJson(data): ApiJson<ResetPasswordData>,
) -> ApiResult<Json<MessageResponse>> {
    ResetPasswordService::new(
        state.store.as_ref(),
        &state.auth,
        state.config.auth.reset_password_min_length,
    )
    .call(data)
    .await
    .into_result()?;

    Ok(Json(MessageResponse {
        message: "Password updated, please sign in again",
    }))
}
