//! Project model
//!
//! Table: projects, project_workers

use bt_core::traits::{Id, Identifiable};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Project status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    #[default]
    Planning,
    Active,
    Paused,
    Completed,
}

impl ProjectStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::Active => "active",
            Self::Paused => "paused",
            Self::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "planning" => Some(Self::Planning),
            "active" => Some(Self::Active),
            "paused" => Some(Self::Paused),
            "completed" => Some(Self::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project entity
///
/// `completed_area <= total_area` is enforced by the project contract.
/// `spent_amount` may exceed `budget`; overspend is reported, not rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub status: ProjectStatus,
    /// Square meters
    pub total_area: f64,
    pub completed_area: f64,
    pub budget: f64,
    pub spent_amount: f64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub location: String,
    /// Worker ids
    #[serde(default)]
    pub assigned_workers: Vec<Id>,
}

impl Project {
    pub fn is_active(&self) -> bool {
        self.status == ProjectStatus::Active
    }

    pub fn has_worker(&self, worker_id: &str) -> bool {
        self.assigned_workers.iter().any(|w| w == worker_id)
    }

    pub fn is_over_budget(&self) -> bool {
        self.spent_amount > self.budget
    }
}

impl Identifiable for Project {
    fn id(&self) -> &str {
        &self.id
    }
}
