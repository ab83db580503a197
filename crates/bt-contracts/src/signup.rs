//! Signup contract

use bt_core::error::{TrackerError, ValidationErrors};
use bt_models::{Role, SPECIALIZATIONS};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::base::{Contract, UserContext, ValidationResult};

/// Digits with optional leading `+` and spaces, dashes or parentheses
static PHONE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+?[0-9][0-9 ()\-]{5,24}$").unwrap()
});

/// Signup form as submitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupData {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub role: String,
    /// Workers only
    #[serde(default)]
    pub specialization: Option<String>,
    /// Employers and suppliers only
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub agree_to_terms: bool,
}

impl SignupData {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    pub fn role(&self) -> Option<Role> {
        Role::parse(&self.role)
    }
}

pub struct SignupContract {
    password_min_length: usize,
}

impl SignupContract {
    pub fn new(password_min_length: usize) -> Self {
        Self { password_min_length }
    }

    fn validate_names(&self, data: &SignupData, errors: &mut ValidationErrors) {
        if data.first_name.trim().is_empty() {
            errors.add("first_name", "can't be blank");
        }
        if data.last_name.trim().is_empty() {
            errors.add("last_name", "can't be blank");
        }
    }

    fn validate_contact(&self, data: &SignupData, errors: &mut ValidationErrors) {
        let email = data.email.trim();
        if email.is_empty() {
            errors.add("email", "can't be blank");
        } else if !validator::validate_email(email) {
            errors.add("email", "is invalid");
        }

        let phone = data.phone.trim();
        if phone.is_empty() {
            errors.add("phone", "can't be blank");
        } else if !PHONE_PATTERN.is_match(phone) {
            errors.add("phone", "is invalid");
        }
    }

    fn validate_password(&self, data: &SignupData, errors: &mut ValidationErrors) {
        if data.password.is_empty() {
            errors.add("password", "can't be blank");
        } else if data.password.chars().count() < self.password_min_length {
            errors.add(
                "password",
                format!("is too short (minimum is {} characters)", self.password_min_length),
            );
        }
        if data.password != data.confirm_password {
            errors.add("confirm_password", "doesn't match password");
        }
    }

    fn validate_role(&self, data: &SignupData, errors: &mut ValidationErrors) {
        let Some(role) = data.role() else {
            errors.add("role", "is not included in the list");
            return;
        };

        match role {
            Role::Worker => {
                let specialization = data.specialization.as_deref().map(str::trim).unwrap_or_default();
                if specialization.is_empty() {
                    errors.add("specialization", "can't be blank");
                } else if !SPECIALIZATIONS
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(specialization))
                {
                    errors.add("specialization", "is not included in the list");
                }
            }
            Role::Employer | Role::Supplier => {
                let company = data.company_name.as_deref().map(str::trim).unwrap_or_default();
                if company.is_empty() {
                    errors.add("company_name", "can't be blank");
                }
            }
        }
    }
}

impl Contract<SignupData> for SignupContract {
    fn validate(&self, data: &SignupData) -> ValidationResult {
        let mut errors = ValidationErrors::new();

        self.validate_names(data, &mut errors);
        self.validate_contact(data, &mut errors);
        self.validate_password(data, &mut errors);
        self.validate_role(data, &mut errors);

        if !data.agree_to_terms {
            errors.add("terms", "must be accepted");
        }

        errors.into_result()
    }
}

/// Role gate for new accounts.
///
/// Anyone may join as a worker. Employer and supplier accounts are opened
/// by an employer, except the first employer of an empty site.
pub struct SignupPolicy<'a, U: UserContext + ?Sized> {
    inviter: Option<&'a U>,
}

impl<'a, U: UserContext + ?Sized> SignupPolicy<'a, U> {
    pub fn new(inviter: Option<&'a U>) -> Self {
        Self { inviter }
    }

    pub fn check(&self, role: Role, first_account: bool) -> Result<(), TrackerError> {
        match self.inviter {
            Some(inviter) if inviter.has_role(Role::Employer) => Ok(()),
            Some(_) => Err(TrackerError::access_denied("create accounts")),
            None => match role {
                Role::Worker => Ok(()),
                Role::Employer if first_account => Ok(()),
                Role::Employer | Role::Supplier => Err(TrackerError::access_denied(format!(
                    "sign up as {}",
                    role.as_str()
                ))),
            },
        }
    }
}
