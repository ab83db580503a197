//! Server-side sessions
//!
//! A session is created on login and is the single source of identity:
//! bearer tokens and cookies both resolve to one. Logout and password
//! resets delete sessions.

use bt_core::config::AuthConfig;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use thiserror::Error;

/// Session errors
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session not found")]
    NotFound,
    #[error("Session expired")]
    Expired,
    #[error("Session store unavailable")]
    Unavailable,
    #[error("User not authenticated")]
    NotAuthenticated,
}

/// Session data
#[derive(Debug, Clone)]
pub struct Session {
    pub id: String,
    pub user_id: String,
    pub created_at: DateTime<Utc>,
    pub accessed_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub user_agent: Option<String>,
}

impl Session {
    /// Create a session for a signed-in user
    pub fn new(user_id: impl Into<String>, lifetime_seconds: i64) -> Self {
        let now = Utc::now();
        Self {
            id: generate_session_id(),
            user_id: user_id.into(),
            created_at: now,
            accessed_at: now,
            expires_at: now + Duration::seconds(lifetime_seconds),
            user_agent: None,
        }
    }

    pub fn is_valid(&self) -> bool {
        Utc::now() < self.expires_at
    }

    /// Slide the expiry forward from now
    pub fn extend(&mut self, lifetime_seconds: i64) {
        self.accessed_at = Utc::now();
        self.expires_at = self.accessed_at + Duration::seconds(lifetime_seconds);
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

fn generate_session_id() -> String {
    use rand::Rng;
    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    const SESSION_ID_LENGTH: usize = 64;

    let mut rng = rand::rng();
    (0..SESSION_ID_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..CHARSET.len());
            CHARSET[idx] as char
        })
        .collect()
}

/// Session store trait for different backends
pub trait SessionStore: Send + Sync {
    /// A live session by ID; expired sessions are not returned
    fn get(&self, session_id: &str) -> Result<Session, SessionError>;

    fn set(&self, session: Session) -> Result<(), SessionError>;

    fn delete(&self, session_id: &str) -> Result<(), SessionError>;

    /// Delete all sessions for a user, returning how many were removed
    fn delete_user_sessions(&self, user_id: &str) -> Result<usize, SessionError>;

    fn cleanup_expired(&self) -> Result<usize, SessionError>;
}

/// In-memory session store
pub struct MemorySessionStore {
    sessions: std::sync::RwLock<HashMap<String, Session>>,
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: std::sync::RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self, session_id: &str) -> Result<Session, SessionError> {
        let sessions = self.sessions.read().map_err(|_| SessionError::Unavailable)?;
        let session = sessions.get(session_id).ok_or(SessionError::NotFound)?;
        if session.is_valid() {
            Ok(session.clone())
        } else {
            Err(SessionError::Expired)
        }
    }

    fn set(&self, session: Session) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Unavailable)?;
        sessions.insert(session.id.clone(), session);
        Ok(())
    }

    fn delete(&self, session_id: &str) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Unavailable)?;
        sessions.remove(session_id);
        Ok(())
    }

    fn delete_user_sessions(&self, user_id: &str) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Unavailable)?;
        let before = sessions.len();
        sessions.retain(|_, s| s.user_id != user_id);
        Ok(before - sessions.len())
    }

    fn cleanup_expired(&self) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Unavailable)?;
        let now = Utc::now();
        let before = sessions.len();
        sessions.retain(|_, s| s.expires_at > now);
        Ok(before - sessions.len())
    }
}

/// Cookie configuration for sessions
#[derive(Debug, Clone)]
pub struct CookieConfig {
    pub name: String,
    pub path: String,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    pub max_age: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "_buildtrack_session".to_string(),
            path: "/".to_string(),
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            max_age: None,
        }
    }
}

impl CookieConfig {
    pub fn from_config(config: &AuthConfig) -> Self {
        Self {
            name: config.cookie_name.clone(),
            secure: config.secure_cookies,
            max_age: Some((config.session_timeout_minutes * 60) as i64),
            ..Default::default()
        }
    }

    /// Build cookie header value
    pub fn build_cookie(&self, session_id: &str) -> String {
        let mut parts = vec![
            format!("{}={}", self.name, session_id),
            format!("Path={}", self.path),
        ];

        if self.secure {
            parts.push("Secure".to_string());
        }

        if self.http_only {
            parts.push("HttpOnly".to_string());
        }

        parts.push(
            match self.same_site {
                SameSite::Strict => "SameSite=Strict",
                SameSite::Lax => "SameSite=Lax",
                SameSite::None => "SameSite=None",
            }
            .to_string(),
        );

        if let Some(max_age) = self.max_age {
            parts.push(format!("Max-Age={}", max_age));
        }

        parts.join("; ")
    }

    /// Build cookie header to clear the session
    pub fn build_clear_cookie(&self) -> String {
        format!("{}=; Path={}; Max-Age=0; HttpOnly", self.name, self.path)
    }
}

/// Extract session ID from cookie header
pub fn extract_session_id(cookie_header: &str, cookie_name: &str) -> Option<String> {
    cookie_header
        .split(';')
        .filter_map(|part| part.trim().split_once('='))
        .find(|(name, _)| name.trim() == cookie_name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
