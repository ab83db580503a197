//! Request authentication
//!
//! Resolves the session behind a request. A bearer token is tried first,
//! then the session cookie. Either way the session must still exist in the
//! session store; a request with neither credential is rejected with
//! `SessionError::NotAuthenticated`.

use bt_core::error::TrackerError;
use std::sync::Arc;
use thiserror::Error;

use crate::jwt::{extract_bearer_token, JwtError, JwtService};
use crate::session::{extract_session_id, CookieConfig, Session, SessionError, SessionStore};

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Token(#[from] JwtError),
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for TrackerError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Internal(message) => TrackerError::Internal(message),
            AuthError::Session(SessionError::Unavailable) => {
                TrackerError::Internal("session store unavailable".into())
            }
            other => TrackerError::unauthorized(other.to_string()),
        }
    }
}

/// Authentication strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthStrategy {
    /// JWT Bearer token
    Jwt,
    /// Session cookie
    Session,
}

/// The session a request was authenticated with
#[derive(Debug, Clone)]
pub struct Identity {
    pub user_id: String,
    pub session_id: String,
    pub strategy: AuthStrategy,
}

/// Request headers relevant for authentication
#[derive(Debug, Default)]
pub struct RequestHeaders {
    pub authorization: Option<String>,
    pub cookie: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestHeaders {
    /// Create from a list of header key-value pairs
    pub fn from_pairs(pairs: &[(impl AsRef<str>, impl AsRef<str>)]) -> Self {
        let mut headers = Self::default();

        for (name, value) in pairs {
            let value = value.as_ref().to_string();
            match name.as_ref().to_ascii_lowercase().as_str() {
                "authorization" => headers.authorization = Some(value),
                "cookie" => headers.cookie = Some(value),
                "user-agent" => headers.user_agent = Some(value),
                _ => {}
            }
        }

        headers
    }
}

/// Issues and checks credentials against one session store
#[derive(Clone)]
pub struct Authenticator {
    jwt: Arc<JwtService>,
    sessions: Arc<dyn SessionStore>,
    cookie: CookieConfig,
    session_lifetime_seconds: i64,
    token_lifetime_seconds: u64,
}

/// Result of a successful sign-in
#[derive(Debug, Clone)]
pub struct SignedIn {
    pub token: String,
    pub session: Session,
    pub expires_in: u64,
}

impl Authenticator {
    pub fn new(
        jwt: JwtService,
        sessions: Arc<dyn SessionStore>,
        cookie: CookieConfig,
        session_lifetime_seconds: i64,
        token_lifetime_seconds: u64,
    ) -> Self {
        Self {
            jwt: Arc::new(jwt),
            sessions,
            cookie,
            session_lifetime_seconds,
            token_lifetime_seconds,
        }
    }

    pub fn from_config(config: &bt_core::config::AuthConfig, sessions: Arc<dyn SessionStore>) -> Self {
        Self::new(
            JwtService::new(config.jwt_secret.as_bytes()),
            sessions,
            CookieConfig::from_config(config),
            (config.session_timeout_minutes * 60) as i64,
            config.token_expiration_seconds,
        )
    }

    pub fn cookie_config(&self) -> &CookieConfig {
        &self.cookie
    }

    /// Open a session for a verified user and sign a token bound to it
    pub fn sign_in(
        &self,
        user: &bt_models::User,
        user_agent: Option<&str>,
    ) -> Result<SignedIn, AuthError> {
        let mut session = Session::new(user.id.clone(), self.session_lifetime_seconds);
        if let Some(agent) = user_agent {
            session = session.with_user_agent(agent);
        }
        let token = self.jwt.create_token(
            &user.id,
            user.role,
            &session.id,
            self.token_lifetime_seconds,
        )?;
        self.sessions.set(session.clone())?;

        tracing::info!(user_id = %user.id, role = %user.role, "User signed in");
        Ok(SignedIn {
            token,
            session,
            expires_in: self.token_lifetime_seconds,
        })
    }

    pub fn sign_out(&self, identity: &Identity) -> Result<(), AuthError> {
        self.sessions.delete(&identity.session_id)?;
        tracing::info!(user_id = %identity.user_id, "User signed out");
        Ok(())
    }

    /// Drop every session of a user
    pub fn revoke_user(&self, user_id: &str) -> Result<usize, AuthError> {
        Ok(self.sessions.delete_user_sessions(user_id)?)
    }

    /// Authenticate a request using available headers
    pub fn authenticate(&self, headers: &RequestHeaders) -> Result<Identity, AuthError> {
        if let Some(token) = headers.authorization.as_deref().and_then(extract_bearer_token) {
            let claims = self.jwt.validate_token(token)?;
            let session = self.live_session(&claims.sid)?;
            if session.user_id != claims.sub {
                return Err(AuthError::InvalidCredentials);
            }
            return Ok(Identity {
                user_id: session.user_id,
                session_id: session.id,
                strategy: AuthStrategy::Jwt,
            });
        }

        if let Some(session_id) = headers
            .cookie
            .as_deref()
            .and_then(|cookie| extract_session_id(cookie, &self.cookie.name))
        {
            let session = self.live_session(&session_id)?;
            return Ok(Identity {
                user_id: session.user_id,
                session_id: session.id,
                strategy: AuthStrategy::Session,
            });
        }

        Err(SessionError::NotAuthenticated.into())
    }

    fn live_session(&self, session_id: &str) -> Result<Session, AuthError> {
        let mut session = self.sessions.get(session_id)?;
        session.extend(self.session_lifetime_seconds);
        self.sessions.set(session.clone())?;
        Ok(session)
    }
}
