//! Work log service

use bt_contracts::base::{present, UserContext};
use bt_contracts::work_logs::{validate_work_log_entry, WorkLogInput, WorkLogPolicy};
use bt_core::error::TrackerError;
use bt_core::traits::new_id;
use bt_models::{Role, WorkLog};
use chrono::Utc;
use tracing::{info, instrument};

use crate::base::ServiceContext;
use crate::result::ServiceResult;

/// Records completed area for a worker on a project.
///
/// A worker who leaves the worker field empty logs for themself.
pub struct LogWorkService<'a, U: UserContext + ?Sized> {
    ctx: ServiceContext<'a, U>,
}

impl<'a, U: UserContext + ?Sized> LogWorkService<'a, U> {
    pub fn new(ctx: ServiceContext<'a, U>) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self, input), fields(user_id = %self.ctx.user.id()))]
    pub async fn call(self, input: WorkLogInput) -> ServiceResult<WorkLog> {
        self.run(input).await.into()
    }

    async fn run(&self, mut input: WorkLogInput) -> Result<WorkLog, TrackerError> {
        let store = self.ctx.store;
        let user = self.ctx.user;

        if user.has_role(Role::Worker) && present(input.worker_id.as_ref()).is_none() {
            input.worker_id = Some(user.id().to_string());
        }

        let worker = match present(input.worker_id.as_ref()) {
            Some(id) => store.find_worker(id).await?,
            None => None,
        };
        let draft = validate_work_log_entry(&input, worker.as_ref(), self.ctx.today)?;

        let project = store
            .find_project(&draft.project_id)
            .await?
            .ok_or_else(|| TrackerError::not_found("project", "id", draft.project_id.clone()))?;
        WorkLogPolicy::new(user).check(&project, &draft.worker_id)?;

        let log = store
            .insert_work_log(draft.into_work_log(new_id("log"), Utc::now()))
            .await?;

        info!(
            log_id = %log.id,
            project_id = %log.project_id,
            worker_id = %log.worker_id,
            area = log.area_completed,
            earnings = log.earnings,
            "Work logged"
        );
        Ok(log)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_db::{seed_demo_data, MemoryStore, WorkLogStore};
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

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 25).unwrap()
    }

    fn input(worker_id: Option<&str>, project_id: &str, area: f64) -> WorkLogInput {
        WorkLogInput {
            project_id: Some(project_id.into()),
            worker_id: worker_id.map(str::to_string),
            area_completed: Some(area),
            date: None,
            description: Some("Ground floor wall".into()),
        }
    }

    #[tokio::test]
    async fn test_worker_logs_for_self() {
        let store = store().await;
        let farid = user("worker-1");
        let ctx = ServiceContext::new(&store, &farid).on(today());

        let result = LogWorkService::new(ctx).call(input(None, "proj-1", 25.0)).await;
        let log = result.into_result().unwrap();
        assert_eq!(log.worker_id, "worker-1");
        assert_eq!(log.earnings, 375.0);
        assert_eq!(log.date, today());

        let logs = store.list_work_logs().await.unwrap();
        assert_eq!(logs[0].id, log.id);
    }

    #[tokio::test]
    async fn test_worker_cannot_log_for_colleague() {
        let store = store().await;
        let farid = user("worker-1");
        let ctx = ServiceContext::new(&store, &farid);

        let result = LogWorkService::new(ctx)
            .call(input(Some("worker-2"), "proj-1", 10.0))
            .await;
        assert!(matches!(result.error(), Some(TrackerError::AccessDenied { .. })));
    }

    #[tokio::test]
    async fn test_worker_cannot_log_on_unassigned_project() {
        let store = store().await;
        let farid = user("worker-1");
        let ctx = ServiceContext::new(&store, &farid);

        let result = LogWorkService::new(ctx).call(input(None, "proj-2", 10.0)).await;
        assert!(matches!(result.error(), Some(TrackerError::AccessDenied { .. })));
    }

    #[tokio::test]
    async fn test_employer_logs_for_worker_at_their_rate() {
        let store = store().await;
        let employer = user("employer-1");
        let ctx = ServiceContext::new(&store, &employer);

        let log = LogWorkService::new(ctx)
            .call(input(Some("worker-4"), "proj-2", 10.0))
            .await
            .into_result()
            .unwrap();
        assert_eq!(log.rate_per_square_meter, 12.0);
        assert_eq!(log.earnings, 120.0);
    }

    #[tokio::test]
    async fn test_supplier_is_denied() {
        let store = store().await;
        let supplier = user("supplier-1");
        let ctx = ServiceContext::new(&store, &supplier);

        let result = LogWorkService::new(ctx)
            .call(input(Some("worker-1"), "proj-1", 10.0))
            .await;
        assert_eq!(result.error().map(|e| e.status_code()), Some(403));
    }

    #[tokio::test]
    async fn test_unknown_project_and_missing_area() {
        let store = store().await;
        let employer = user("employer-1");

        let result = LogWorkService::new(ServiceContext::new(&store, &employer))
            .call(input(Some("worker-1"), "proj-404", 10.0))
            .await;
        assert!(matches!(result.error(), Some(TrackerError::NotFound { .. })));

        let mut no_area = input(Some("worker-1"), "proj-1", 10.0);
        no_area.area_completed = None;
        let result = LogWorkService::new(ServiceContext::new(&store, &employer))
            .call(no_area)
            .await;
        assert!(matches!(
            result.error(),
            Some(TrackerError::MissingField { field: "area_completed" })
        ));
    }
}
