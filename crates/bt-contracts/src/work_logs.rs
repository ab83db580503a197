//! Work log entry contract

use bt_core::error::TrackerError;
use bt_core::traits::Id;
use bt_models::{Project, Role, WorkLog, Worker};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::base::{present, UserContext};
use crate::visibility::can_log_against;

/// Work log form as submitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkLogInput {
    #[serde(default)]
    pub project_id: Option<String>,
    /// Defaults to the acting worker when omitted
    #[serde(default)]
    pub worker_id: Option<String>,
    #[serde(default)]
    pub area_completed: Option<f64>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
}

/// An accepted work log, not yet stored
#[derive(Debug, Clone, PartialEq)]
pub struct WorkLogDraft {
    pub project_id: Id,
    pub worker_id: Id,
    pub worker_name: String,
    pub date: NaiveDate,
    pub area_completed: f64,
    pub rate_per_square_meter: f64,
    pub earnings: f64,
    pub description: String,
}

impl WorkLogDraft {
    pub fn into_work_log(self, id: Id, created_at: DateTime<Utc>) -> WorkLog {
        WorkLog {
            id,
            worker_id: self.worker_id,
            worker_name: self.worker_name,
            project_id: self.project_id,
            date: self.date,
            area_completed: self.area_completed,
            rate_per_square_meter: self.rate_per_square_meter,
            earnings: self.earnings,
            description: self.description,
            created_at,
        }
    }
}

/// Validate a work log form.
///
/// `worker` is the profile resolved from `input.worker_id`. Fields are
/// checked in form order (project, worker, area) and the first failure
/// wins. Earnings are `area x rate` at full precision.
pub fn validate_work_log_entry(
    input: &WorkLogInput,
    worker: Option<&Worker>,
    today: NaiveDate,
) -> Result<WorkLogDraft, TrackerError> {
    let project_id = present(input.project_id.as_ref()).ok_or_else(|| TrackerError::missing("project"))?;

    let worker = match (present(input.worker_id.as_ref()), worker) {
        (Some(_), Some(worker)) => worker,
        _ => return Err(TrackerError::missing("worker")),
    };

    let area = input
        .area_completed
        .ok_or_else(|| TrackerError::missing("area_completed"))?;
    if !area.is_finite() || area <= 0.0 {
        return Err(TrackerError::invalid_quantity("area_completed", area));
    }

    Ok(WorkLogDraft {
        project_id: project_id.to_string(),
        worker_id: worker.id.clone(),
        worker_name: worker.name.clone(),
        date: input.date.unwrap_or(today),
        area_completed: area,
        rate_per_square_meter: worker.rate_per_square_meter,
        earnings: area * worker.rate_per_square_meter,
        description: input
            .description
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
    })
}

/// Who may log work where
pub struct WorkLogPolicy<'a, U: UserContext + ?Sized> {
    user: &'a U,
}

impl<'a, U: UserContext + ?Sized> WorkLogPolicy<'a, U> {
    pub fn new(user: &'a U) -> Self {
        Self { user }
    }

    /// Workers log for themselves on assigned projects; employers log on
    /// behalf of any worker on an active project; suppliers never log work.
    pub fn check(&self, project: &Project, worker_id: &str) -> Result<(), TrackerError> {
        match self.user.role() {
            Some(Role::Worker) => {
                if worker_id != self.user.id() {
                    return Err(TrackerError::access_denied("log work for another worker"));
                }
            }
            Some(Role::Employer) => {}
            Some(Role::Supplier) | None => {
                return Err(TrackerError::access_denied("log work"));
            }
        }

        if !can_log_against(project, self.user) {
            return Err(TrackerError::access_denied(format!(
                "log work on project {}",
                project.id
            )));
        }
        Ok(())
    }
}
