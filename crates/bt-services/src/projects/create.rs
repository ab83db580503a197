//! Create Service for Projects

use bt_contracts::base::UserContext;
use bt_contracts::projects::ProjectContract;
use bt_core::error::TrackerError;
use bt_core::traits::new_id;
use bt_models::{Project, ProjectStatus};
use tracing::{info, instrument};

use super::set_attributes::SetAttributesService;
use super::ProjectParams;
use crate::base::ServiceContext;
use crate::result::ServiceResult;

/// Service for creating projects
///
/// # Example
/// ```ignore
/// let params = ProjectParams::new()
///     .with_name("Warehouse C")
///     .with_areas(900.0, 0.0)
///     .with_budget(140_000.0);
/// let result = CreateProjectService::new(ctx).call(params).await;
/// ```
pub struct CreateProjectService<'a, U: UserContext + ?Sized> {
    ctx: ServiceContext<'a, U>,
}

impl<'a, U: UserContext + ?Sized> CreateProjectService<'a, U> {
    pub fn new(ctx: ServiceContext<'a, U>) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, params), fields(user_id = %self.ctx.user.id()))]
    pub async fn call(self, params: ProjectParams) -> ServiceResult<Project> {
        self.run(params).await.into()
    }

    async fn run(&self, params: ProjectParams) -> Result<Project, TrackerError> {
        ProjectContract::new(self.ctx.user).authorize()?;

        let start = params.start_date.unwrap_or(self.ctx.today);
        let blank = Project {
            id: new_id("proj"),
            name: String::new(),
            description: String::new(),
            status: ProjectStatus::Planning,
            total_area: 0.0,
            completed_area: 0.0,
            budget: 0.0,
            spent_amount: 0.0,
            start_date: start,
            end_date: params.end_date.unwrap_or(start),
            location: String::new(),
            assigned_workers: Vec::new(),
        };

        let project = SetAttributesService::new(self.ctx.user, self.ctx.store)
            .call(blank, &params)
            .await?;
        let project = self.ctx.store.insert_project(project).await?;

        info!(project_id = %project.id, name = %project.name, "Project created");
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_db::{seed_demo_data, DirectoryStore, MemoryStore};
    use bt_models::{fixtures, User};
    use chrono::NaiveDate;

    fn user(id: &str) -> User {
        fixtures::users().into_iter().find(|u| u.id == id).unwrap()
    }

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        seed_demo_data(&store, fixtures::users()).await.unwrap();
        store
    }

    fn params() -> ProjectParams {
        ProjectParams::new()
            .with_name("Warehouse C")
            .with_areas(900.0, 0.0)
            .with_budget(140_000.0)
            .with_dates(
                NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 9, 30).unwrap(),
            )
            .with_location("Bokhtar, Tajikistan")
    }

    #[tokio::test]
    async fn test_employer_creates_project() {
        let store = store().await;
        let employer = user("employer-1");

        let project = CreateProjectService::new(ServiceContext::new(&store, &employer))
            .call(params().with_workers(["worker-4"]))
            .await
            .into_result()
            .unwrap();
        assert!(project.id.starts_with("proj-"));
        assert_eq!(project.status, ProjectStatus::Planning);

        let rustam = store.find_worker("worker-4").await.unwrap().unwrap();
        assert!(rustam.is_assigned_to(&project.id));
    }

    #[tokio::test]
    async fn test_non_employers_are_denied() {
        let store = store().await;
        for id in ["worker-1", "supplier-1"] {
            let actor = user(id);
            let result = CreateProjectService::new(ServiceContext::new(&store, &actor))
                .call(params())
                .await;
            assert!(matches!(result.error(), Some(TrackerError::AccessDenied { .. })), "{}", id);
        }
    }

    #[tokio::test]
    async fn test_field_errors_are_aggregated() {
        let store = store().await;
        let employer = user("employer-1");

        let result = CreateProjectService::new(ServiceContext::new(&store, &employer))
            .call(
                ProjectParams::new()
                    .with_areas(100.0, 150.0)
                    .with_status("archived")
                    .with_workers(["worker-99"]),
            )
            .await;

        let errors = result.errors().unwrap();
        assert!(errors.has_error("name"));
        assert!(errors.has_error("completed_area"));
        assert!(errors.has_error("status"));
        assert!(errors.has_error("assigned_workers"));
    }
}
