//! Axum extractors for API handlers

use axum::{
    async_trait,
    extract::{FromRef, FromRequest, FromRequestParts},
    http::{
        header::{AUTHORIZATION, COOKIE, USER_AGENT},
        request::Parts,
        HeaderMap, HeaderName,
    },
};
use bt_attachments::{PhotoPolicy, ProfilePhotoService, Storage};
use bt_auth::{Authenticator, CurrentUser, Identity, RequestHeaders, SessionStore};
use bt_core::config::AppConfig;
use bt_core::error::TrackerError;
use bt_db::Store;
use bt_services::ServiceContext;
use std::sync::Arc;

use crate::error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub auth: Authenticator,
    pub photos: Arc<ProfilePhotoService>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        store: Arc<dyn Store>,
        sessions: Arc<dyn SessionStore>,
        photo_storage: Arc<dyn Storage>,
    ) -> Self {
        let auth = Authenticator::from_config(&config.auth, sessions);
        let photos = ProfilePhotoService::new(photo_storage, PhotoPolicy::from_config(&config.storage));
        Self {
            store,
            auth,
            photos: Arc::new(photos),
            config: Arc::new(config),
        }
    }

    /// Service context for one request's user
    pub fn context<'a>(&'a self, user: &'a AuthenticatedUser) -> ServiceContext<'a, CurrentUser> {
        ServiceContext::new(self.store.as_ref(), &user.user)
    }
}

fn header(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

/// The headers the authenticator looks at
pub fn request_headers(headers: &HeaderMap) -> RequestHeaders {
    RequestHeaders {
        authorization: header(headers, AUTHORIZATION),
        cookie: header(headers, COOKIE),
        user_agent: header(headers, USER_AGENT),
    }
}

/// Authenticated user extractor
///
/// Resolves the bearer token or session cookie, then reloads the account so
/// a deleted user cannot keep using a live session.
pub struct AuthenticatedUser {
    pub user: CurrentUser,
    pub identity: Identity,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let identity = app_state
            .auth
            .authenticate(&request_headers(&parts.headers))
            .map_err(TrackerError::from)?;

        let user = app_state
            .store
            .find_user(&identity.user_id)
            .await
            .map_err(TrackerError::from)?
            .ok_or_else(|| ApiError::unauthorized("account no longer exists"))?;

        Ok(AuthenticatedUser {
            user: CurrentUser::new(&user, identity.session_id.clone()),
            identity,
        })
    }
}

impl std::ops::Deref for AuthenticatedUser {
    type Target = CurrentUser;

    fn deref(&self) -> &Self::Target {
        &self.user
    }
}

/// JSON body whose rejections render as API errors
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string whose rejections render as API errors
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        headers.insert(USER_AGENT, HeaderValue::from_static("curl/8.0"));

        let extracted = request_headers(&headers);
        assert_eq!(extracted.authorization.as_deref(), Some("Bearer abc"));
        assert_eq!(extracted.user_agent.as_deref(), Some("curl/8.0"));
        assert!(extracted.cookie.is_none());
    }
}
