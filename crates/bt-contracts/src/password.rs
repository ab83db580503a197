//! Password reset contracts

use bt_core::error::ValidationErrors;
use serde::{Deserialize, Serialize};

use crate::base::{Contract, ValidationResult};

/// Minimum length of a password chosen through the reset flow
pub const RESET_PASSWORD_MIN_LENGTH: usize = 8;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForgotPasswordData {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordData {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

/// Checks the address a reset link is requested for
pub struct ForgotPasswordContract;

impl Contract<ForgotPasswordData> for ForgotPasswordContract {
    fn validate(&self, data: &ForgotPasswordData) -> ValidationResult {
        let mut errors = ValidationErrors::new();
        let email = data.email.trim();
        if email.is_empty() {
            errors.add("email", "can't be blank");
        } else if !email.contains('@') {
            errors.add("email", "is invalid");
        }
        errors.into_result()
    }
}

pub struct ResetPasswordContract {
    min_length: usize,
}

impl ResetPasswordContract {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }
}

impl Default for ResetPasswordContract {
    fn default() -> Self {
        Self::new(RESET_PASSWORD_MIN_LENGTH)
    }
}

impl Contract<ResetPasswordData> for ResetPasswordContract {
    fn validate(&self, data: &ResetPasswordData) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        if data.token.trim().is_empty() {
            errors.add("token", "can't be blank");
        }

        if data.password.trim().is_empty() {
            errors.add("password", "can't be blank");
        } else if data.password.chars().count() < self.min_length {
            errors.add(
                "password",
                format!("is too short (minimum is {} characters)", self.min_length),
            );
        }

        if data.password != data.password_confirmation {
            errors.add("password_confirmation", "doesn't match password");
        }

        errors.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reset(password: &str, confirmation: &str) -> ResetPasswordData {
        ResetPasswordData {
            token: "abc123".into(),
            password: password.into(),
            password_confirmation: confirmation.into(),
        }
    }

    #[test]
    fn test_forgot_password_email() {
        let contract = ForgotPasswordContract;
        assert!(contract.validate(&ForgotPasswordData { email: "farid@worker.tj".into() }).is_ok());
        assert!(contract.validate(&ForgotPasswordData { email: " ".into() }).is_err());
        assert!(contract.validate(&ForgotPasswordData { email: "farid".into() }).is_err());
    }

    #[test]
    fn test_reset_requires_eight_characters() {
        let contract = ResetPasswordContract::default();
        assert!(contract.validate(&reset("longenough", "longenough")).is_ok());

        let errors = contract.validate(&reset("short7!", "short7!")).unwrap_err();
        assert!(errors.has_error("password"));
    }

    #[test]
    fn test_reset_confirmation_must_match() {
        let contract = ResetPasswordContract::default();
        let errors = contract.validate(&reset("longenough", "longenougH")).unwrap_err();
        assert!(errors.has_error("password_confirmation"));
        assert!(!errors.has_error("password"));
    }

    #[test]
    fn test_reset_requires_token() {
        let contract = ResetPasswordContract::default();
        let mut data = reset("longenough", "longenough");
        data.token.clear();
        assert!(contract.validate(&data).unwrap_err().has_error("token"));
    }
}
