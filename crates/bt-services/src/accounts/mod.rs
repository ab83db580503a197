//! Account services
//!
//! Signup, sign-in, password reset and per-user preferences.

mod login;
mod password;
mod preferences;
mod signup;

pub use login::{LoginOutcome, LoginParams, LoginService};
pub use password::{ForgotPasswordService, ResetPasswordService};
pub use preferences::UpdatePreferencesService;
pub use signup::SignupService;

use bt_core::error::{TrackerError, ValidationErrors};

pub(crate) fn email_taken() -> TrackerError {
    let mut errors = ValidationErrors::new();
    errors.add("email", "has already been taken");
    TrackerError::Validation(errors)
}

#[cfg(test)]
pub(crate) mod tests {
    use bt_auth::{hash_password, Authenticator, CookieConfig, JwtService, MemorySessionStore};
    use bt_db::{seed_demo_data, MemoryStore};
    use bt_models::fixtures::{self, DEMO_PASSWORD};
    use std::sync::Arc;

    pub(crate) fn authenticator() -> Authenticator {
        Authenticator::new(
            JwtService::new(b"test-secret-key-at-least-32-bytes"),
            Arc::new(MemorySessionStore::new()),
            CookieConfig::default(),
            3600,
            3600,
        )
    }

    /// Demo data with every account using the demo password
    pub(crate) async fn hashed_store() -> MemoryStore {
        let hash = hash_password(DEMO_PASSWORD).unwrap();
        let users = fixtures::users()
            .into_iter()
            .map(|u| u.with_password_hash(hash.clone()))
            .collect();
        let store = MemoryStore::new();
        seed_demo_data(&store, users).await.unwrap();
        store
    }
}
