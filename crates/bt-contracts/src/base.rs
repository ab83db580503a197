//! Base contract system

use bt_core::error::ValidationErrors;
use bt_models::{Role, User};

/// Result of contract validation
pub type ValidationResult = Result<(), ValidationErrors>;

/// The acting user as contracts see it.
///
/// `role()` is `None` for an anonymous or unrecognized user; every
/// contract treats that as "no access".
pub trait UserContext: Send + Sync {
    fn id(&self) -> &str;
    fn name(&self) -> &str;
    fn role(&self) -> Option<Role>;

    fn has_role(&self, role: Role) -> bool {
        self.role() == Some(role)
    }
}

impl UserContext for User {
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

/// Base contract trait
pub trait Contract<T>: Send + Sync {
    /// Validate the entity
    fn validate(&self, entity: &T) -> ValidationResult;
}

/// Trimmed value of an optional text field; blank counts as absent
pub fn present(value: Option<&String>) -> Option<&str> {
    value.map(|v| v.trim()).filter(|v| !v.is_empty())
}
