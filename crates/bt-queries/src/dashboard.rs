//! Role dashboards
//!
//! Each role gets its own set of headline figures. Inputs are the full
//! collections; visibility is applied here so a dashboard never counts
//! records its viewer cannot see.

use bt_contracts::visibility::{visible_material_requests, visible_projects, visible_work_logs};
use bt_contracts::UserContext;
use bt_models::{Material, MaterialRequest, Project, ProjectStatus, RequestStatus, Role, WorkLog};
use serde::{Deserialize, Serialize};

use crate::metrics::{
    budget_used_percentage, delivered_value, progress_percentage, request_counts, stock_level,
    worker_area_total, worker_earnings_total, StockLevel,
};

/// Number of projects listed under "recent"
pub const RECENT_PROJECTS: usize = 2;

/// Collections a dashboard is computed from
#[derive(Debug, Clone, Copy)]
pub struct DashboardSource<'a> {
    pub projects: &'a [Project],
    pub work_logs: &'a [WorkLog],
    pub materials: &'a [Material],
    pub material_requests: &'a [MaterialRequest],
}

/// Project card shown on a dashboard
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub id: String,
    pub name: String,
    pub status: ProjectStatus,
    pub location: String,
    pub progress_percentage: f64,
    pub budget_used_percentage: f64,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            status: project.status,
            location: project.location.clone(),
            progress_percentage: progress_percentage(project),
            budget_used_percentage: budget_used_percentage(project),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmployerDashboard {
    pub total_projects: usize,
    pub active_projects: usize,
    pub completed_projects: usize,
    pub pending_requests: usize,
    pub total_budget: f64,
    pub total_spent: f64,
    pub recent_projects: Vec<ProjectSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerDashboard {
    pub assigned_projects: usize,
    pub total_earnings: f64,
    pub work_log_count: usize,
    pub pending_requests: usize,
    pub total_area: f64,
    pub recent_projects: Vec<ProjectSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupplierDashboard {
    pub managed_materials: usize,
    pub low_stock_count: usize,
    pub delivered_value: f64,
    /// Pending and approved requests
    pub open_requests: usize,
    pub active_projects: usize,
    pub recent_projects: Vec<ProjectSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Dashboard {
    Employer(EmployerDashboard),
    Worker(WorkerDashboard),
    Supplier(SupplierDashboard),
}

fn recent(projects: &[Project]) -> Vec<ProjectSummary> {
    projects.iter().take(RECENT_PROJECTS).map(ProjectSummary::from).collect()
}

/// Dashboard for `user`, `None` without a recognized role
pub fn dashboard_for<U: UserContext + ?Sized>(user: &U, source: &DashboardSource<'_>) -> Option<Dashboard> {
    let projects = visible_projects(source.projects, user);
    let requests = visible_material_requests(source.material_requests, user);

    let dashboard = match user.role()? {
        Role::Employer => {
            let active: Vec<Project> = projects.iter().filter(|p| p.is_active()).cloned().collect();
            Dashboard::Employer(EmployerDashboard {
                total_projects: projects.len(),
                active_projects: active.len(),
                completed_projects: projects
                    .iter()
                    .filter(|p| p.status == ProjectStatus::Completed)
                    .count(),
                pending_requests: request_counts(&requests).pending,
                total_budget: projects.iter().map(|p| p.budget).sum(),
                total_spent: projects.iter().map(|p| p.spent_amount).sum(),
                recent_projects: recent(&active),
            })
        }
        Role::Worker => {
            let logs = visible_work_logs(source.work_logs, user);
            Dashboard::Worker(WorkerDashboard {
                assigned_projects: projects.len(),
                total_earnings: worker_earnings_total(user.id(), &logs),
                work_log_count: logs.len(),
                pending_requests: requests
                    .iter()
                    .filter(|r| r.status == RequestStatus::Pending)
                    .count(),
                total_area: worker_area_total(user.id(), &logs),
                recent_projects: recent(&projects),
            })
        }
        Role::Supplier => Dashboard::Supplier(SupplierDashboard {
            managed_materials: source.materials.len(),
            low_stock_count: source
                .materials
                .iter()
                .filter(|m| stock_level(m) == StockLevel::Low)
                .count(),
            delivered_value: delivered_value(source.materials),
            open_requests: request_counts(&requests).open(),
            active_projects: projects.len(),
            recent_projects: recent(&projects),
        }),
    };

    Some(dashboard)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_models::{fixtures, User};

    struct Data {
        projects: Vec<Project>,
        work_logs: Vec<WorkLog>,
        materials: Vec<Material>,
        material_requests: Vec<MaterialRequest>,
    }

    impl Data {
        fn fixtures() -> Self {
            Self {
                projects: fixtures::projects(),
                work_logs: fixtures::work_logs(),
                materials: fixtures::materials(),
                material_requests: fixtures::material_requests(),
            }
        }

        fn source(&self) -> DashboardSource<'_> {
            DashboardSource {
                projects: &self.projects,
                work_logs: &self.work_logs,
                materials: &self.materials,
                material_requests: &self.material_requests,
            }
        }
    }

    fn user(id: &str) -> User {
        fixtures::users().into_iter().find(|u| u.id == id).unwrap()
    }

    #[test]
    fn test_employer_dashboard() {
        let data = Data::fixtures();
        let Some(Dashboard::Employer(d)) = dashboard_for(&user("employer-1"), &data.source()) else {
            panic!("expected employer dashboard");
        };
        assert_eq!(d.total_projects, 3);
        assert_eq!(d.active_projects, 2);
        assert_eq!(d.completed_projects, 1);
        assert_eq!(d.pending_requests, 2);
        assert_eq!(d.total_budget, 550_000.0);
        assert_eq!(d.total_spent, 334_500.0);
        assert_eq!(d.recent_projects.len(), RECENT_PROJECTS);
        assert!(d.recent_projects.iter().all(|p| p.status == ProjectStatus::Active));
    }

    #[test]
    fn test_worker_dashboard() {
        let data = Data::fixtures();
        let Some(Dashboard::Worker(d)) = dashboard_for(&user("worker-1"), &data.source()) else {
            panic!("expected worker dashboard");
        };
        assert_eq!(d.assigned_projects, 2);
        assert_eq!(d.total_earnings, 825.0);
        assert_eq!(d.work_log_count, 2);
        assert_eq!(d.total_area, 55.0);
        assert_eq!(d.pending_requests, 1);
    }

    #[test]
    fn test_supplier_dashboard() {
        let data = Data::fixtures();
        let Some(Dashboard::Supplier(d)) = dashboard_for(&user("supplier-1"), &data.source()) else {
            panic!("expected supplier dashboard");
        };
        assert_eq!(d.managed_materials, 4);
        assert_eq!(d.low_stock_count, 0);
        assert_eq!(d.delivered_value, 3200.0 * 0.8 + 1300.0 * 2.5 + 520.0 * 12.0 + 45.0 * 8.0);
        assert_eq!(d.open_requests, 3);
        assert_eq!(d.active_projects, 2);
    }

    #[test]
    fn test_dashboard_json_is_tagged_by_role() {
        let data = Data::fixtures();
        let dashboard = dashboard_for(&user("worker-2"), &data.source()).unwrap();
        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["role"], "worker");
        assert!(json["recentProjects"].is_array());
    }
}
