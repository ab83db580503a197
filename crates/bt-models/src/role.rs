//! Role model
//!
//! A user holds exactly one role for the lifetime of the account.

use serde::{Deserialize, Serialize};
use std::fmt;

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Employer,
    Worker,
    Supplier,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Employer, Role::Worker, Role::Supplier];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Employer => "employer",
            Role::Worker => "worker",
            Role::Supplier => "supplier",
        }
    }

    /// Parse a stored or submitted role name. Unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Role> {
        match value.trim().to_ascii_lowercase().as_str() {
            "employer" => Some(Role::Employer),
            "worker" => Some(Role::Worker),
            "supplier" => Some(Role::Supplier),
            _ => None,
        }
    }

    /// Employers and suppliers run a company and must name it at signup
    pub fn requires_company(&self) -> bool {
        matches!(self, Role::Employer | Role::Supplier)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
