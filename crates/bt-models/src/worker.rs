//! Worker profile
//!
//! A worker profile shares its id with the worker's user account.

use bt_core::traits::{Id, Identifiable};
use serde::{Deserialize, Serialize};

/// Trades offered at signup
pub const SPECIALIZATIONS: &[&str] = &[
    "Mason",
    "Carpenter",
    "Electrician",
    "Plumber",
    "Painter",
    "Roofer",
    "Welder",
    "General Labor",
];

/// Rate given to a worker who signs up, until an employer sets theirs
pub const DEFAULT_RATE_PER_SQUARE_METER: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Worker {
    pub id: Id,
    pub name: String,
    pub specialization: String,
    /// Pay rate, copied into each work log at the time it is recorded
    pub rate_per_square_meter: f64,
    #[serde(default)]
    pub phone: String,
    /// Derived from the projects' assignment lists when read from a store
    #[serde(default)]
    pub projects_assigned: Vec<Id>,
}

impl Worker {
    pub fn new(
        id: impl Into<Id>,
        name: impl Into<String>,
        specialization: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            specialization: specialization.into(),
            rate_per_square_meter: DEFAULT_RATE_PER_SQUARE_METER,
            phone: phone.into(),
            projects_assigned: Vec::new(),
        }
    }

    pub fn is_assigned_to(&self, project_id: &str) -> bool {
        self.projects_assigned.iter().any(|p| p == project_id)
    }
}

impl Identifiable for Worker {
    fn id(&self) -> &str {
        &self.id
    }
}
