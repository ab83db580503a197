//! The signed-in user for one request

use bt_contracts::UserContext;
use bt_models::{Role, User};
use serde::Serialize;

/// Identity resolved from a token or session cookie
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentUser {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(skip)]
    pub session_id: String,
}

impl CurrentUser {
    pub fn new(user: &User, session_id: impl Into<String>) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            session_id: session_id.into(),
        }
    }
}

impl UserContext for CurrentUser {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn role(&self) -> Option<Role> {
        Some(self.role)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_user_from_user() {
        let user = User::new("supplier-1", "Gulnora Supply Co.", Role::Supplier, "info@gulnora.tj");
        let current = CurrentUser::new(&user, "s1");
        assert!(current.has_role(Role::Supplier));
        assert_eq!(UserContext::name(&current), "Gulnora Supply Co.");
        assert_eq!(current.session_id, "s1");
    }
}
