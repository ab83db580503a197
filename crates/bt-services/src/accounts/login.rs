//! Login Service

use bt_auth::{verify_password, verify_without_account, Authenticator, SignedIn};
use bt_core::error::TrackerError;
use bt_db::Store;
use bt_models::{Role, User};
use serde::Deserialize;
use tracing::{instrument, warn};

use crate::result::ServiceResult;

const INVALID_LOGIN: &str = "invalid email, password or role";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginParams {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// When given, must be the account's role
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub user: User,
    pub signed_in: SignedIn,
}

/// Checks credentials and opens a session
pub struct LoginService<'a> {
    store: &'a dyn Store,
    authenticator: &'a Authenticator,
}

impl<'a> LoginService<'a> {
    pub fn new(store: &'a dyn Store, authenticator: &'a Authenticator) -> Self {
        Self { store, authenticator }
    }

    #[instrument(skip(self, params, user_agent))]
    pub async fn call(self, params: LoginParams, user_agent: Option<&str>) -> ServiceResult<LoginOutcome> {
        self.run(params, user_agent).await.into()
    }

    async fn run(&self, params: LoginParams, user_agent: Option<&str>) -> Result<LoginOutcome, TrackerError> {
        let user = self.store.find_user_by_email(&params.email).await?;

        // unknown accounts pay for a verification too
        let verified = match user.as_ref().and_then(|u| u.password_hash.as_deref()) {
            Some(hash) => verify_password(&params.password, hash),
            None => verify_without_account(&params.password),
        };
        let user = match user {
            Some(user) if verified => user,
            Some(user) => {
                warn!(user_id = %user.id, "Failed login attempt");
                return Err(TrackerError::unauthorized(INVALID_LOGIN));
            }
            None => return Err(TrackerError::unauthorized(INVALID_LOGIN)),
        };

        if let Some(requested) = params.role.as_deref().filter(|r| !r.trim().is_empty()) {
            if Role::parse(requested) != Some(user.role) {
                warn!(user_id = %user.id, requested, "Login with mismatched role");
                return Err(TrackerError::unauthorized(INVALID_LOGIN));
            }
        }

        let signed_in = self.authenticator.sign_in(&user, user_agent)?;
        Ok(LoginOutcome { user, signed_in })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::tests::{authenticator, hashed_store};
    use bt_auth::RequestHeaders;
    use bt_models::fixtures::DEMO_PASSWORD;

    fn params(email: &str, password: &str, role: Option<&str>) -> LoginParams {
        LoginParams {
            email: email.into(),
            password: password.into(),
            role: role.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_login_issues_a_working_token() {
        let store = hashed_store().await;
        let auth = authenticator();

        let outcome = LoginService::new(&store, &auth)
            .call(params("Farid@Worker.tj", DEMO_PASSWORD, Some("worker")), Some("tests"))
            .await
            .into_result()
            .unwrap();
        assert_eq!(outcome.user.id, "worker-1");

        let headers = RequestHeaders {
            authorization: Some(format!("Bearer {}", outcome.signed_in.token)),
            ..Default::default()
        };
        assert_eq!(auth.authenticate(&headers).unwrap().user_id, "worker-1");
    }

    #[tokio::test]
    async fn test_bad_credentials_are_unauthorized() {
        let store = hashed_store().await;
        let auth = authenticator();

        for attempt in [
            params("farid@worker.tj", "wrong-password", None),
            params("nobody@worker.tj", DEMO_PASSWORD, None),
            params("farid@worker.tj", DEMO_PASSWORD, Some("employer")),
        ] {
            let result = LoginService::new(&store, &auth).call(attempt, None).await;
            assert_eq!(result.error().map(|e| e.status_code()), Some(401));
        }
    }
}
