//! Project services
//!
//! - `create` - employers open a new project
//! - `update` - employers edit an existing one
//! - `set_attributes` - copies submitted params onto a project

mod create;
mod set_attributes;
mod update;

pub use create::CreateProjectService;
pub use set_attributes::SetAttributesService;
pub use update::UpdateProjectService;

use chrono::NaiveDate;
use serde::Deserialize;

/// Project service params; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectParams {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub total_area: Option<f64>,
    #[serde(default)]
    pub completed_area: Option<f64>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub spent_amount: Option<f64>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub assigned_workers: Option<Vec<String>>,
}

impl ProjectParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_areas(mut self, total: f64, completed: f64) -> Self {
        self.total_area = Some(total);
        self.completed_area = Some(completed);
        self
    }

    pub fn with_budget(mut self, budget: f64) -> Self {
        self.budget = Some(budget);
        self
    }

    pub fn with_spent_amount(mut self, spent: f64) -> Self {
        self.spent_amount = Some(spent);
        self
    }

    pub fn with_dates(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_workers<I, S>(mut self, workers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assigned_workers = Some(workers.into_iter().map(Into::into).collect());
        self
    }
}
