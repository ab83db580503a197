//! Read services
//!
//! Loads collections from the store and narrows them to what the user may
//! see before any list filter runs.

use bt_contracts::base::UserContext;
use bt_contracts::visibility::{
    can_see_project, loggable_projects, visible_material_requests, visible_movements,
    visible_projects, visible_work_logs,
};
use bt_core::error::TrackerError;
use bt_core::result::TrackerResult;
use bt_models::{MaterialMovement, MaterialRequest, Project, WorkLog};
use bt_queries::{
    dashboard_for, material_counts, project_counts, project_detail, Dashboard, DashboardSource,
    MaterialCounts, MaterialFilter, MaterialView, ProjectCounts, ProjectDetail, ProjectFilter,
    RequestFilter, WorkLogFilter,
};

use crate::base::{require_role, ServiceContext};

pub struct QueryService<'a, U: UserContext + ?Sized> {
    ctx: ServiceContext<'a, U>,
}

impl<'a, U: UserContext + ?Sized> QueryService<'a, U> {
    pub fn new(ctx: ServiceContext<'a, U>) -> Self {
        Self { ctx }
    }

    pub async fn projects(&self, filter: &ProjectFilter) -> TrackerResult<Vec<Project>> {
        let all = self.ctx.store.list_projects().await?;
        Ok(filter.apply(&visible_projects(&all, self.ctx.user)))
    }

    /// Per-status tab counts over the projects the user can see
    pub async fn project_counts(&self) -> TrackerResult<ProjectCounts> {
        let all = self.ctx.store.list_projects().await?;
        Ok(project_counts(&visible_projects(&all, self.ctx.user)))
    }

    /// Projects the user may log work or materials against
    pub async fn loggable_projects(&self) -> TrackerResult<Vec<Project>> {
        let all = self.ctx.store.list_projects().await?;
        Ok(loggable_projects(&all, self.ctx.user))
    }

    /// A project outside the user's view reads as missing
    pub async fn project(&self, id: &str) -> TrackerResult<Project> {
        self.ctx
            .store
            .find_project(id)
            .await?
            .filter(|p| can_see_project(p, self.ctx.user))
            .ok_or_else(|| TrackerError::not_found("project", "id", id))
    }

    /// The project with its progress, its logs and the team's share of them
    pub async fn project_detail(&self, id: &str) -> TrackerResult<ProjectDetail> {
        let project = self.project(id).await?;
        let logs = self.work_logs(&WorkLogFilter::new().project(id)).await?;
        let workers = self.ctx.store.list_workers().await?;
        Ok(project_detail(project, &logs, &workers, self.ctx.user))
    }

    pub async fn work_logs(&self, filter: &WorkLogFilter) -> TrackerResult<Vec<WorkLog>> {
        let all = self.ctx.store.list_work_logs().await?;
        Ok(filter.apply(&visible_work_logs(&all, self.ctx.user)))
    }

    /// The material catalogue is shared by every role
    pub async fn materials(&self, filter: &MaterialFilter) -> TrackerResult<Vec<MaterialView>> {
        require_role(self.ctx.user)?;
        let all = self.ctx.store.list_materials().await?;
        Ok(filter.apply(&all).into_iter().map(MaterialView::from).collect())
    }

    /// Stock level counts over the catalogue and status counts over the
    /// requests the user can see
    pub async fn material_counts(&self) -> TrackerResult<MaterialCounts> {
        require_role(self.ctx.user)?;
        let materials = self.ctx.store.list_materials().await?;
        let requests = self.ctx.store.list_material_requests().await?;
        Ok(material_counts(
            &materials,
            &visible_material_requests(&requests, self.ctx.user),
        ))
    }

    /// Workers see the movements they recorded; employers and suppliers see all
    pub async fn movements(&self) -> TrackerResult<Vec<MaterialMovement>> {
        require_role(self.ctx.user)?;
        let all = self.ctx.store.list_movements().await?;
        Ok(visible_movements(&all, self.ctx.user))
    }

    pub async fn material_requests(&self, filter: &RequestFilter) -> TrackerResult<Vec<MaterialRequest>> {
        let all = self.ctx.store.list_material_requests().await?;
        Ok(filter.apply(&visible_material_requests(&all, self.ctx.user)))
    }

    pub async fn dashboard(&self) -> TrackerResult<Dashboard> {
        let store = self.ctx.store;
        let projects = store.list_projects().await?;
        let work_logs = store.list_work_logs().await?;
        let materials = store.list_materials().await?;
        let material_requests = store.list_material_requests().await?;

        let source = DashboardSource {
            projects: &projects,
            work_logs: &work_logs,
            materials: &materials,
            material_requests: &material_requests,
        };
        dashboard_for(self.ctx.user, &source)
            .ok_or_else(|| TrackerError::unauthorized("sign in required"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_db::{seed_demo_data, MemoryStore};
    use bt_models::{fixtures, ProjectStatus, RequestStatus, User};

    fn user(id: &str) -> User {
        fixtures::users().into_iter().find(|u| u.id == id).unwrap()
    }

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        seed_demo_data(&store, fixtures::users()).await.unwrap();
        store
    }

    fn ids<T>(items: &[T], id: impl Fn(&T) -> &str) -> Vec<String> {
        let mut ids: Vec<String> = items.iter().map(|i| id(i).to_string()).collect();
        ids.sort();
        ids
    }

    #[tokio::test]
    async fn test_projects_are_scoped_by_role() {
        let store = store().await;

        let sanjar = user("worker-3");
        let projects = QueryService::new(ServiceContext::new(&store, &sanjar))
            .projects(&ProjectFilter::default())
            .await
            .unwrap();
        assert_eq!(ids(&projects, |p| &p.id), vec!["proj-1", "proj-3"]);

        let supplier = user("supplier-1");
        let projects = QueryService::new(ServiceContext::new(&store, &supplier))
            .projects(&ProjectFilter::default())
            .await
            .unwrap();
        assert!(projects.iter().all(|p| p.status == ProjectStatus::Active));
        assert_eq!(projects.len(), 2);
    }

    #[tokio::test]
    async fn test_hidden_project_reads_as_missing() {
        let store = store().await;
        let rustam = user("worker-4");
        let queries = QueryService::new(ServiceContext::new(&store, &rustam));

        assert!(queries.project("proj-2").await.is_ok());
        let err = queries.project("proj-1").await.unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_employer_pending_filter() {
        let store = store().await;
        let employer = user("employer-1");

        let pending = QueryService::new(ServiceContext::new(&store, &employer))
            .material_requests(&RequestFilter::new().status(RequestStatus::Pending))
            .await
            .unwrap();
        assert_eq!(ids(&pending, |r| &r.id), vec!["req-1", "req-5"]);
    }

    #[tokio::test]
    async fn test_work_logs_hidden_from_suppliers() {
        let store = store().await;

        let supplier = user("supplier-1");
        let logs = QueryService::new(ServiceContext::new(&store, &supplier))
            .work_logs(&WorkLogFilter::default())
            .await
            .unwrap();
        assert!(logs.is_empty());

        let farid = user("worker-1");
        let logs = QueryService::new(ServiceContext::new(&store, &farid))
            .work_logs(&WorkLogFilter::default())
            .await
            .unwrap();
        assert_eq!(ids(&logs, |l| &l.id), vec!["log-1", "log-3"]);
    }

    #[tokio::test]
    async fn test_work_logs_by_project() {
        let store = store().await;
        let employer = user("employer-1");
        let queries = QueryService::new(ServiceContext::new(&store, &employer));

        let proj1 = queries.work_logs(&WorkLogFilter::new().project("proj-1")).await.unwrap();
        assert_eq!(ids(&proj1, |l| &l.id), vec!["log-1", "log-2", "log-3"]);
        let proj2 = queries.work_logs(&WorkLogFilter::new().project("proj-2")).await.unwrap();
        assert!(proj2.is_empty());
    }

    #[tokio::test]
    async fn test_project_detail_respects_visibility() {
        let store = store().await;

        let employer = user("employer-1");
        let detail = QueryService::new(ServiceContext::new(&store, &employer))
            .project_detail("proj-1")
            .await
            .unwrap();
        assert_eq!(detail.work_logs.len(), 3);
        assert_eq!(detail.team.len(), 3);

        let jamshid = user("worker-2");
        let detail = QueryService::new(ServiceContext::new(&store, &jamshid))
            .project_detail("proj-1")
            .await
            .unwrap();
        assert_eq!(ids(&detail.work_logs, |l| &l.id), vec!["log-2"]);
        assert_eq!(detail.team.len(), 1);
        assert_eq!(detail.team[0].earnings, 324.0);

        let rustam = user("worker-4");
        let err = QueryService::new(ServiceContext::new(&store, &rustam))
            .project_detail("proj-1")
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 404);
    }

    #[tokio::test]
    async fn test_material_views_and_counts() {
        let store = store().await;
        let farid = user("worker-1");
        let queries = QueryService::new(ServiceContext::new(&store, &farid));

        let materials = queries.materials(&MaterialFilter::default()).await.unwrap();
        assert_eq!(materials.len(), 4);
        assert!(materials.iter().all(|m| (0.0..=1.0).contains(&m.stock_ratio)));

        let counts = queries.material_counts().await.unwrap();
        assert_eq!(counts.stock_levels.medium_stock + counts.stock_levels.well_stocked, 4);
        let own = fixtures::material_requests()
            .into_iter()
            .filter(|r| r.worker_id == "worker-1")
            .count();
        assert_eq!(counts.requests.total(), own);

        let counts = QueryService::new(ServiceContext::new(&store, &farid))
            .project_counts()
            .await
            .unwrap();
        assert_eq!(counts.all, 2);
        assert_eq!(counts.completed, 1);
    }

    #[tokio::test]
    async fn test_worker_dashboard_totals() {
        let store = store().await;
        let farid = user("worker-1");

        let dashboard = QueryService::new(ServiceContext::new(&store, &farid))
            .dashboard()
            .await
            .unwrap();
        match dashboard {
            Dashboard::Worker(worker) => {
                assert_eq!(worker.total_earnings, 825.0);
                assert_eq!(worker.work_log_count, 2);
                assert_eq!(worker.pending_requests, 1);
            }
            other => panic!("unexpected dashboard {:?}", other),
        }
    }
}
