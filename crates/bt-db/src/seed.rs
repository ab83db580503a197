//! Demo data
//!
//! Loads the demo company into an empty store. Callers pass the users in
//! so passwords can be hashed outside this crate.

use bt_models::{fixtures, User};

use crate::repository::RepositoryResult;
use crate::store::Store;

/// Insert the demo dataset unless the store already has users.
///
/// Returns `true` when data was inserted.
pub async fn seed_demo_data<S>(store: &S, users: Vec<User>) -> RepositoryResult<bool>
where
    S: Store + ?Sized,
{
    if store.count_users().await? > 0 {
        tracing::debug!("Store already has users, skipping demo data");
        return Ok(false);
    }

    for user in users {
        store.insert_user(user).await?;
    }
    for project in fixtures::projects() {
        store.insert_project(project).await?;
    }
    for worker in fixtures::workers() {
        store.insert_worker(worker).await?;
    }
    for supplier in fixtures::suppliers() {
        store.insert_supplier(supplier).await?;
    }
    for material in fixtures::materials() {
        store.insert_material(material).await?;
    }
    for log in fixtures::work_logs() {
        store.insert_work_log(log).await?;
    }
    for request in fixtures::material_requests() {
        store.insert_material_request(request).await?;
    }

    tracing::info!("Seeded demo data");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::store::{DirectoryStore, MaterialRequestStore, UserStore};

    #[tokio::test]
    async fn test_seed_runs_once() {
        let store = MemoryStore::new();
        assert!(seed_demo_data(&store, fixtures::users()).await.unwrap());
        assert!(!seed_demo_data(&store, fixtures::users()).await.unwrap());

        assert_eq!(
            store.count_users().await.unwrap(),
            fixtures::users().len() as i64
        );
        assert_eq!(store.list_material_requests().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_seeded_workers_carry_assignments() {
        let store = MemoryStore::new();
        seed_demo_data(&store, fixtures::users()).await.unwrap();

        for expected in fixtures::workers() {
            let worker = store.find_worker(&expected.id).await.unwrap().unwrap();
            assert_eq!(worker.projects_assigned, expected.projects_assigned);
        }
    }
}
