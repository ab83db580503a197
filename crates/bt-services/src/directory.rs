//! Worker and supplier directories

use bt_contracts::base::UserContext;
use bt_core::error::TrackerError;
use bt_core::result::TrackerResult;
use bt_models::{Role, Supplier, Worker};
use bt_queries::metrics::{worker_area_total, worker_earnings_total};
use serde::Serialize;

use crate::base::{require_role, ServiceContext};

/// A worker profile with totals over all of their work logs
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerSummary {
    #[serde(flatten)]
    pub worker: Worker,
    pub total_earnings: f64,
    pub total_area: f64,
}

/// Employers browse both directories; suppliers see the supplier list
pub struct DirectoryService<'a, U: UserContext + ?Sized> {
    ctx: ServiceContext<'a, U>,
}

impl<'a, U: UserContext + ?Sized> DirectoryService<'a, U> {
    pub fn new(ctx: ServiceContext<'a, U>) -> Self {
        Self { ctx }
    }

    pub async fn workers(&self) -> TrackerResult<Vec<WorkerSummary>> {
        if require_role(self.ctx.user)? != Role::Employer {
            return Err(TrackerError::access_denied("view the worker directory"));
        }

        let workers = self.ctx.store.list_workers().await?;
        let logs = self.ctx.store.list_work_logs().await?;
        Ok(workers
            .into_iter()
            .map(|worker| WorkerSummary {
                total_earnings: worker_earnings_total(&worker.id, &logs),
                total_area: worker_area_total(&worker.id, &logs),
                worker,
            })
            .collect())
    }

    pub async fn suppliers(&self) -> TrackerResult<Vec<Supplier>> {
        match require_role(self.ctx.user)? {
            Role::Employer | Role::Supplier => Ok(self.ctx.store.list_suppliers().await?),
            Role::Worker => Err(TrackerError::access_denied("view the supplier directory")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bt_db::{seed_demo_data, MemoryStore};
    use bt_models::{fixtures, User};

    fn user(id: &str) -> User {
        fixtures::users().into_iter().find(|u| u.id == id).unwrap()
    }

    async fn store() -> MemoryStore {
        let store = MemoryStore::new();
        seed_demo_data(&store, fixtures::users()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_worker_directory_has_earnings() {
        let store = store().await;
        let employer = user("employer-1");

        let workers = DirectoryService::new(ServiceContext::new(&store, &employer))
            .workers()
            .await
            .unwrap();
        let farid = workers.iter().find(|w| w.worker.id == "worker-1").unwrap();
        assert_eq!(farid.total_earnings, 825.0);
        assert_eq!(farid.total_area, 55.0);

        let json = serde_json::to_value(farid).unwrap();
        assert_eq!(json["specialization"], "Mason");
        assert_eq!(json["totalEarnings"], 825.0);
    }

    #[tokio::test]
    async fn test_directory_access() {
        let store = store().await;

        let farid = user("worker-1");
        let directory = DirectoryService::new(ServiceContext::new(&store, &farid));
        assert!(matches!(directory.workers().await, Err(TrackerError::AccessDenied { .. })));
        assert!(matches!(directory.suppliers().await, Err(TrackerError::AccessDenied { .. })));

        let supplier = user("supplier-1");
        let suppliers = DirectoryService::new(ServiceContext::new(&store, &supplier))
            .suppliers()
            .await
            .unwrap();
        assert_eq!(suppliers.len(), 3);
    }
}
