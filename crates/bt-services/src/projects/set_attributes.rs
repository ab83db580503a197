//! Set Attributes Service for Projects

use bt_contracts::base::{Contract, UserContext};
use bt_contracts::projects::ProjectContract;
use bt_core::error::{TrackerError, ValidationErrors};
use bt_db::Store;
use bt_models::{Project, ProjectStatus};
use tracing::warn;

use super::ProjectParams;

/// Applies params to a project and validates the result
pub struct SetAttributesService<'a, U: UserContext + ?Sized> {
    user: &'a U,
    store: &'a dyn Store,
}

impl<'a, U: UserContext + ?Sized> SetAttributesService<'a, U> {
    pub fn new(user: &'a U, store: &'a dyn Store) -> Self {
        Self { user, store }
    }

    pub async fn call(&self, mut project: Project, params: &ProjectParams) -> Result<Project, TrackerError> {
        let contract = ProjectContract::new(self.user);
        let mut errors = ValidationErrors::new();

        if let Some(name) = &params.name {
            project.name = name.trim().to_string();
        }
        if let Some(description) = &params.description {
            project.description = description.trim().to_string();
        }
        if let Some(status) = &params.status {
            match ProjectStatus::parse(status) {
                Some(status) => project.status = status,
                None => errors.add("status", "is not included in the list"),
            }
        }
        if let Some(total) = params.total_area {
            project.total_area = total;
        }
        if let Some(completed) = params.completed_area {
            project.completed_area = completed;
        }
        if let Some(budget) = params.budget {
            project.budget = budget;
        }
        if let Some(spent) = params.spent_amount {
            project.spent_amount = spent;
        }
        if let Some(start) = params.start_date {
            project.start_date = start;
        }
        if let Some(end) = params.end_date {
            project.end_date = end;
        }
        if let Some(location) = &params.location {
            project.location = location.trim().to_string();
        }
        if let Some(workers) = &params.assigned_workers {
            let mut assigned: Vec<String> = Vec::with_capacity(workers.len());
            for id in workers.iter().map(|w| w.trim()).filter(|w| !w.is_empty()) {
                if assigned.iter().any(|a| a == id) {
                    continue;
                }
                if self.store.find_worker(id).await?.is_none() {
                    errors.add("assigned_workers", format!("contains unknown worker {}", id));
                }
                assigned.push(id.to_string());
            }
            project.assigned_workers = assigned;
        }

        if let Err(contract_errors) = contract.validate(&project) {
            errors.merge(contract_errors);
        }
        errors.into_result()?;

        if project.is_over_budget() {
            warn!(
                project_id = %project.id,
                budget = project.budget,
                spent = project.spent_amount,
                "Project spending exceeds its budget"
            );
        }
        Ok(project)
    }
}
