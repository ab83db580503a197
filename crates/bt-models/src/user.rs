//! User model
//!
//! Table: users

use bt_core::traits::{Id, Identifiable};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::role::Role;

/// Per-user display preferences
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPreferences {
    #[serde(default)]
    pub dark_mode: bool,
}

/// User entity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Id,

    /// Display name
    #[validate(length(min = 1, max = 255))]
    pub name: String,

    pub role: Role,

    /// Login email (unique, stored lowercase)
    #[validate(email)]
    pub email: String,

    #[serde(default)]
    pub phone: Option<String>,

    /// Company name for employers and suppliers
    #[serde(default)]
    pub company_name: Option<String>,

    /// Argon2 PHC string
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,

    #[serde(default)]
    pub preferences: UserPreferences,

    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: impl Into<Id>, name: impl Into<String>, role: Role, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            role,
            email: normalize_email(&email.into()),
            phone: None,
            company_name: None,
            password_hash: None,
            preferences: UserPreferences::default(),
            created_at: Utc::now(),
        }
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_company(mut self, company: impl Into<String>) -> Self {
        self.company_name = Some(company.into());
        self
    }

    pub fn with_password_hash(mut self, hash: impl Into<String>) -> Self {
        self.password_hash = Some(hash.into());
        self
    }
}

impl Identifiable for User {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Emails are compared case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_new_normalizes_email() {
        let user = User::new("worker-1", "Farid Nazarov", Role::Worker, " Farid@Worker.TJ ");
        assert_eq!(user.email, "farid@worker.tj");
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_invalid_email_fails_validation() {
        let user = User::new("u", "Someone", Role::Employer, "not-an-email");
        assert!(user.validate().is_err());
    }

    #[test]
    fn test_password_hash_not_serialized() {
        let user = User::new("u", "Someone", Role::Supplier, "s@example.com")
            .with_password_hash("$argon2id$secret");
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert_eq!(json["role"], "supplier");
        assert_eq!(json["preferences"]["darkMode"], false);
    }
}
