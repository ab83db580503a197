//! Detail views
//!
//! Records enriched with the figures the project and materials pages show.
//! Inputs must already be narrowed by visibility; team figures count only
//! the logs the viewer can see.

use bt_contracts::UserContext;
use bt_models::{Material, MaterialRequest, Project, Role, WorkLog, Worker};
use serde::{Deserialize, Serialize};

use crate::filters::{for_project, stock_level_counts, StockLevelCounts};
use crate::metrics::{
    budget_used_percentage, progress_percentage, request_counts, stock_level, stock_ratio,
    used_percentage, worker_area_total, worker_earnings_total, RequestCounts, StockLevel,
};

/// One assigned worker's contribution to a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub worker_id: String,
    pub name: String,
    pub specialization: String,
    pub rate_per_square_meter: f64,
    pub earnings: f64,
    pub area_completed: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub progress_percentage: f64,
    pub budget_used_percentage: f64,
    /// Newest first, as stored
    pub work_logs: Vec<WorkLog>,
    pub team: Vec<TeamMember>,
}

/// Employers see the whole team, a worker sees their own entry, suppliers
/// see none
fn on_team<U: UserContext + ?Sized>(worker: &Worker, user: &U) -> bool {
    match user.role() {
        Some(Role::Employer) => true,
        Some(Role::Worker) => worker.id == user.id(),
        Some(Role::Supplier) | None => false,
    }
}

pub fn project_detail<U: UserContext + ?Sized>(
    project: Project,
    visible_logs: &[WorkLog],
    workers: &[Worker],
    user: &U,
) -> ProjectDetail {
    let work_logs = for_project(visible_logs, &project.id);
    let team = project
        .assigned_workers
        .iter()
        .filter_map(|id| workers.iter().find(|w| &w.id == id))
        .filter(|w| on_team(w, user))
        .map(|w| TeamMember {
            worker_id: w.id.clone(),
            name: w.name.clone(),
            specialization: w.specialization.clone(),
            rate_per_square_meter: w.rate_per_square_meter,
            earnings: worker_earnings_total(&w.id, &work_logs),
            area_completed: worker_area_total(&w.id, &work_logs),
        })
        .collect();

    ProjectDetail {
        progress_percentage: progress_percentage(&project),
        budget_used_percentage: budget_used_percentage(&project),
        project,
        work_logs,
        team,
    }
}

/// Material with its stock health
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialView {
    #[serde(flatten)]
    pub material: Material,
    pub stock_ratio: f64,
    pub stock_level: StockLevel,
    pub used_percentage: f64,
}

impl From<Material> for MaterialView {
    fn from(material: Material) -> Self {
        Self {
            stock_ratio: stock_ratio(&material),
            stock_level: stock_level(&material),
            used_percentage: used_percentage(&material),
            material,
        }
    }
}

/// Tab counts on the materials page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialCounts {
    pub stock_levels: StockLevelCounts,
    pub requests: RequestCounts,
}

pub fn material_counts(materials: &[Material], visible_requests: &[MaterialRequest]) -> MaterialCounts {
    MaterialCounts {
        stock_levels: stock_level_counts(materials),
        requests: request_counts(visible_requests),
    }
}
