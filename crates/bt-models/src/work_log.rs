//! Work log model
//!
//! Table: work_logs

use bt_core::traits::{Authored, Id, Identifiable, ProjectScoped};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A record of area completed by one worker on one day.
///
/// `earnings` is fixed when the log is recorded from the worker's rate at
/// that moment; later rate changes never touch it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLog {
    pub id: Id,
    pub worker_id: Id,
    pub worker_name: String,
    pub project_id: Id,
    pub date: NaiveDate,
    pub area_completed: f64,
    pub rate_per_square_meter: f64,
    pub earnings: f64,
    #[serde(default)]
    pub description: String,
    pub created_at: DateTime<Utc>,
}

impl Identifiable for WorkLog {
    fn id(&self) -> &str {
        &self.id
    }
}

impl ProjectScoped for WorkLog {
    fn project_id(&self) -> &str {
        &self.project_id
    }
}

impl Authored for WorkLog {
    fn author_id(&self) -> &str {
        &self.worker_id
    }
}
