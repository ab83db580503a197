//! Update Service for Projects

use bt_contracts::base::UserContext;
use bt_contracts::projects::ProjectContract;
use bt_core::error::TrackerError;
use bt_models::Project;
use tracing::{info, instrument};

use super::set_attributes::SetAttributesService;
use super::ProjectParams;
use crate::base::ServiceContext;
use crate::result::ServiceResult;

pub struct UpdateProjectService<'a, U: UserContext + ?Sized> {
    ctx: ServiceContext<'a, U>,
}

impl<'a, U: UserContext + ?Sized> UpdateProjectService<'a, U> {
    pub fn new(ctx: ServiceContext<'a, U>) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, params), fields(user_id = %self.ctx.user.id()))]
    pub async fn call(self, project_id: &str, params: ProjectParams) -> ServiceResult<Project> {
        self.run(project_id, params).await.into()
    }

    async fn run(&self, project_id: &str, params: ProjectParams) -> Result<Project, TrackerError> {
        ProjectContract::new(self.ctx.user).authorize()?;

        let project = self
            .ctx
            .store
            .find_project(project_id)
            .await?
            .ok_or_else(|| TrackerError::not_found("project", "id", project_id))?;

        let project = SetAttributesService::new(self.ctx.user, self.ctx.store)
            .call(project, &params)
            .await?;
        let project = self.ctx.store.update_project(project).await?;

        info!(project_id = %project.id, status = %project.status, "Project updated");
        Ok(project)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_db::{seed_demo_data, DirectoryStore, MemoryStore, ProjectStore};
    use bt_models::{fixtures, ProjectStatus, User};

    fn user(id: &str) -> User {
        fixtures::users().into_iter().find(|u| u.id == id).unwrap()
    }

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        seed_demo_data(&store, fixtures::users()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_partial_update_keeps_other_fields() {
        let store = store().await;
        let employer = user("employer-1");

        let project = UpdateProjectService::new(ServiceContext::new(&store, &employer))
            .call("proj-2", ProjectParams::new().with_status("paused"))
            .await
            .into_result()
            .unwrap();
        assert_eq!(project.status, ProjectStatus::Paused);
        assert_eq!(project.total_area, 800.0);

        let stored = store.find_project("proj-2").await.unwrap().unwrap();
        assert_eq!(stored, project);
    }

    #[tokio::test]
    async fn test_overspend_is_saved() {
        let store = store().await;
        let employer = user("employer-1");

        let project = UpdateProjectService::new(ServiceContext::new(&store, &employer))
            .call("proj-1", ProjectParams::new().with_spent_amount(300_000.0))
            .await
            .into_result()
            .unwrap();
        assert!(project.is_over_budget());
    }

    #[tokio::test]
    async fn test_reassignment_moves_workers() {
        let store = store().await;
        let employer = user("employer-1");

        UpdateProjectService::new(ServiceContext::new(&store, &employer))
            .call("proj-2", ProjectParams::new().with_workers(["worker-2", "worker-1"]))
            .await
            .into_result()
            .unwrap();

        let farid = store.find_worker("worker-1").await.unwrap().unwrap();
        assert!(farid.is_assigned_to("proj-2"));
        let rustam = store.find_worker("worker-4").await.unwrap().unwrap();
        assert!(!rustam.is_assigned_to("proj-2"));
    }

    #[tokio::test]
    async fn test_completed_area_bound_and_missing_project() {
        let store = store().await;
        let employer = user("employer-1");

        let result = UpdateProjectService::new(ServiceContext::new(&store, &employer))
            .call("proj-1", ProjectParams::new().with_areas(1200.0, 1300.0))
            .await;
        assert!(result.errors().map(|e| e.has_error("completed_area")).unwrap_or(false));

        let result = UpdateProjectService::new(ServiceContext::new(&store, &employer))
            .call("proj-404", ProjectParams::new().with_status("active"))
            .await;
        assert_eq!(result.error().map(|e| e.status_code()), Some(404));
    }
}
