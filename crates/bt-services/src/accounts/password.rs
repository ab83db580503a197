//! Password reset services
//!
//! Requesting a reset always succeeds, whether or not the address belongs
//! to an account. Mail delivery is not wired up; the token is written to
//! the debug log.

use bt_auth::{hash_password, issue_reset_token, token_digest, Authenticator};
use bt_contracts::base::Contract;
use bt_contracts::password::{
    ForgotPasswordContract, ForgotPasswordData, ResetPasswordContract, ResetPasswordData,
};
use bt_core::error::{TrackerError, ValidationErrors};
use bt_db::{PasswordResetToken, Store};
use chrono::{Duration, Utc};
use tracing::{debug, info, instrument};

use crate::result::ServiceResult;

pub struct ForgotPasswordService<'a> {
    store: &'a dyn Store,
    token_ttl: Duration,
}

impl<'a> ForgotPasswordService<'a> {
    pub fn new(store: &'a dyn Store, token_ttl: Duration) -> Self {
        Self { store, token_ttl }
    }

    #[instrument(skip(self, data))]
    pub async fn call(self, data: ForgotPasswordData) -> ServiceResult<()> {
        self.run(data).await.into()
    }

    async fn run(&self, data: ForgotPasswordData) -> Result<(), TrackerError> {
        ForgotPasswordContract.validate(&data)?;

        let Some(user) = self.store.find_user_by_email(&data.email).await? else {
            debug!("Password reset requested for unknown address");
            return Ok(());
        };

        let issued = issue_reset_token();
        self.store
            .insert_reset_token(PasswordResetToken {
                digest: issued.digest,
                user_id: user.id.clone(),
                expires_at: Utc::now() + self.token_ttl,
            })
            .await?;

        debug!(user_id = %user.id, token = %issued.token, "Password reset token issued");
        Ok(())
    }
}

/// Consumes a reset token, sets the new password and signs the user out
/// everywhere
pub struct ResetPasswordService<'a> {
    store: &'a dyn Store,
    authenticator: &'a Authenticator,
    contract: ResetPasswordContract,
}

impl<'a> ResetPasswordService<'a> {
    pub fn new(store: &'a dyn Store, authenticator: &'a Authenticator, min_length: usize) -> Self {
        Self {
            store,
            authenticator,
            contract: ResetPasswordContract::new(min_length),
        }
    }

    #[instrument(skip(self, data))]
    pub async fn call(self, data: ResetPasswordData) -> ServiceResult<String> {
        self.run(data).await.into()
    }

    async fn run(&self, data: ResetPasswordData) -> Result<String, TrackerError> {
        self.contract.validate(&data)?;

        let token = self
            .store
            .take_reset_token(&token_digest(&data.token))
            .await?
            .filter(|t| !t.is_expired(Utc::now()))
            .ok_or_else(invalid_token)?;

        let password_hash = hash_password(&data.password)?;
        self.store
            .update_password_hash(&token.user_id, &password_hash)
            .await?;
        self.store.delete_reset_tokens_for(&token.user_id).await?;
        let revoked = self.authenticator.revoke_user(&token.user_id)?;

        info!(user_id = %token.user_id, revoked_sessions = revoked, "Password reset");
        Ok(token.user_id)
    }
}

fn invalid_token() -> TrackerError {
    let mut errors = ValidationErrors::new();
    errors.add("token", "is invalid or has expired");
    TrackerError::Validation(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::tests::{authenticator, hashed_store};
    use bt_auth::verify_password;
    use bt_db::{MemoryStore, ResetTokenStore, UserStore};
    use bt_models::fixtures;

    async fn plant_token(store: &MemoryStore, user_id: &str, token: &str, ttl: Duration) {
        store
            .insert_reset_token(PasswordResetToken {
                digest: token_digest(token),
                user_id: user_id.into(),
                expires_at: Utc::now() + ttl,
            })
            .await
            .unwrap();
    }

    fn reset(token: &str) -> ResetPasswordData {
        ResetPasswordData {
            token: token.into(),
            password: "new-password".into(),
            password_confirmation: "new-password".into(),
        }
    }

    #[tokio::test]
    async fn test_forgot_password_never_discloses_accounts() {
        let store = hashed_store().await;

        for email in ["farid@worker.tj", "nobody@worker.tj"] {
            let result = ForgotPasswordService::new(&store, Duration::hours(1))
                .call(ForgotPasswordData { email: email.into() })
                .await;
            assert!(result.is_success(), "{}", email);
        }

        let result = ForgotPasswordService::new(&store, Duration::hours(1))
            .call(ForgotPasswordData { email: "no-at-sign".into() })
            .await;
        assert!(result.errors().map(|e| e.has_error("email")).unwrap_or(false));
    }

    #[tokio::test]
    async fn test_reset_sets_password_and_revokes_sessions() {
        let store = hashed_store().await;
        let auth = authenticator();
        let farid = fixtures::users().remove(1);
        let signed_in = auth.sign_in(&farid, None).unwrap();
        plant_token(&store, "worker-1", "reset-token-1", Duration::hours(1)).await;

        let user_id = ResetPasswordService::new(&store, &auth, 8)
            .call(reset("reset-token-1"))
            .await
            .into_result()
            .unwrap();
        assert_eq!(user_id, "worker-1");

        let stored = store.find_user("worker-1").await.unwrap().unwrap();
        assert!(verify_password("new-password", stored.password_hash.as_deref().unwrap()));

        let headers = bt_auth::RequestHeaders {
            authorization: Some(format!("Bearer {}", signed_in.token)),
            ..Default::default()
        };
        assert!(auth.authenticate(&headers).is_err());

        let again = ResetPasswordService::new(&store, &auth, 8)
            .call(reset("reset-token-1"))
            .await;
        assert!(again.errors().map(|e| e.has_error("token")).unwrap_or(false));
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let store = hashed_store().await;
        let auth = authenticator();
        plant_token(&store, "worker-1", "stale", Duration::seconds(-5)).await;

        let result = ResetPasswordService::new(&store, &auth, 8).call(reset("stale")).await;
        assert!(result.errors().map(|e| e.has_error("token")).unwrap_or(false));
    }

    #[tokio::test]
    async fn test_short_password_is_rejected_before_the_token_is_used() {
        let store = hashed_store().await;
        let auth = authenticator();
        plant_token(&store, "worker-1", "keep-me", Duration::hours(1)).await;

        let mut data = reset("keep-me");
        data.password = "short".into();
        data.password_confirmation = "short".into();
        let result = ResetPasswordService::new(&store, &auth, 8).call(data).await;
        assert!(result.errors().map(|e| e.has_error("password")).unwrap_or(false));

        assert!(store.take_reset_token(&token_digest("keep-me")).await.unwrap().is_some());
    }
}
