//! In-memory store
//!
//! Used by the test suites and when no database URL is configured. All
//! tables sit behind one `RwLock`, so every write, including the
//! check-and-apply of a stock movement, happens under a single write guard.

use async_trait::async_trait;
use bt_core::error::TrackerError;
use bt_models::user::normalize_email;
use bt_models::{
    Material, MaterialMovement, MaterialRequest, MovementKind, Project, RequestStatus, Supplier,
    User, UserPreferences, WorkLog, Worker,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::repository::{RepositoryError, RepositoryResult};
use crate::store::{
    DirectoryProfile, DirectoryStore, MaterialRequestStore, MaterialStore, PasswordResetToken, ProjectStore,
    ResetTokenStore, UserStore, WorkLogStore,
};

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    projects: Vec<Project>,
    workers: Vec<Worker>,
    suppliers: Vec<Supplier>,
    work_logs: Vec<WorkLog>,
    materials: Vec<Material>,
    movements: Vec<MaterialMovement>,
    material_requests: Vec<MaterialRequest>,
    reset_tokens: HashMap<String, PasswordResetToken>,
}

impl Tables {
    fn projects_of(&self, worker_id: &str) -> Vec<String> {
        self.projects
            .iter()
            .filter(|p| p.has_worker(worker_id))
            .map(|p| p.id.clone())
            .collect()
    }

    fn with_assignments(&self, worker: &Worker) -> Worker {
        let mut worker = worker.clone();
        worker.projects_assigned = self.projects_of(&worker.id);
        worker
    }
}

/// Store that keeps everything in process memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: &str) -> RepositoryResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        let email = normalize_email(email);
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn count_users(&self) -> RepositoryResult<i64> {
        Ok(self.tables.read().await.users.len() as i64)
    }

    async fn insert_user(&self, user: User) -> RepositoryResult<User> {
        self.insert_account(user, None).await
    }

    async fn insert_account(&self, mut user: User, profile: Option<DirectoryProfile>) -> RepositoryResult<User> {
        user.email = normalize_email(&user.email);
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(
                "a user with this email already exists".into(),
            ));
        }
        if tables.users.iter().any(|u| u.id == user.id) {
            return Err(RepositoryError::Conflict(format!("user {} already exists", user.id)));
        }
        match profile {
            Some(DirectoryProfile::Worker(worker)) => {
                if tables.workers.iter().any(|w| w.id == worker.id) {
                    return Err(RepositoryError::Conflict("worker profile already exists".into()));
                }
                tables.workers.push(worker);
            }
            Some(DirectoryProfile::Supplier(supplier)) => {
                if tables.suppliers.iter().any(|s| s.id == supplier.id) {
                    return Err(RepositoryError::Conflict("supplier already exists".into()));
                }
                tables.suppliers.push(supplier);
            }
            None => {}
        }
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| RepositoryError::not_found("user", id))?;
        user.password_hash = Some(password_hash.to_string());
        Ok(())
    }

    async fn update_preferences(&self, id: &str, preferences: UserPreferences) -> RepositoryResult<User> {
        let mut tables = self.tables.write().await;
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| RepositoryError::not_found("user", id))?;
        user.preferences = preferences;
        Ok(user.clone())
    }
}

#[async_trait]
impl ProjectStore for MemoryStore {
    async fn list_projects(&self) -> RepositoryResult<Vec<Project>> {
        Ok(self.tables.read().await.projects.clone())
    }

    async fn find_project(&self, id: &str) -> RepositoryResult<Option<Project>> {
        let tables = self.tables.read().await;
        Ok(tables.projects.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_project(&self, project: Project) -> RepositoryResult<Project> {
        let mut tables = self.tables.write().await;
        if tables.projects.iter().any(|p| p.id == project.id) {
            return Err(RepositoryError::Conflict("project already exists".into()));
        }
        tables.projects.push(project.clone());
        Ok(project)
    }

    async fn update_project(&self, project: Project) -> RepositoryResult<Project> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .projects
            .iter_mut()
            .find(|p| p.id == project.id)
            .ok_or_else(|| RepositoryError::not_found("project", &project.id))?;
        *stored = project.clone();
        Ok(project)
    }
}

#[async_trait]
impl DirectoryStore for MemoryStore {
    async fn list_workers(&self) -> RepositoryResult<Vec<Worker>> {
        let tables = self.tables.read().await;
        let mut workers: Vec<Worker> = tables
            .workers
            .iter()
            .map(|w| tables.with_assignments(w))
            .collect();
        workers.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(workers)
    }

    async fn find_worker(&self, id: &str) -> RepositoryResult<Option<Worker>> {
        let tables = self.tables.read().await;
        Ok(tables
            .workers
            .iter()
            .find(|w| w.id == id)
            .map(|w| tables.with_assignments(w)))
    }

    async fn insert_worker(&self, worker: Worker) -> RepositoryResult<Worker> {
        let mut tables = self.tables.write().await;
        if tables.workers.iter().any(|w| w.id == worker.id) {
            return Err(RepositoryError::Conflict("worker profile already exists".into()));
        }
        tables.workers.push(worker.clone());
        Ok(tables.with_assignments(&worker))
    }

    async fn list_suppliers(&self) -> RepositoryResult<Vec<Supplier>> {
        let mut suppliers = self.tables.read().await.suppliers.clone();
        suppliers.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(suppliers)
    }

    async fn insert_supplier(&self, supplier: Supplier) -> RepositoryResult<Supplier> {
        let mut tables = self.tables.write().await;
        if tables.suppliers.iter().any(|s| s.id == supplier.id) {
            return Err(RepositoryError::Conflict("supplier already exists".into()));
        }
        tables.suppliers.push(supplier.clone());
        Ok(supplier)
    }
}

#[async_trait]
impl WorkLogStore for MemoryStore {
    async fn list_work_logs(&self) -> RepositoryResult<Vec<WorkLog>> {
        let mut logs = self.tables.read().await.work_logs.clone();
        logs.sort_by(|a, b| (b.date, b.created_at).cmp(&(a.date, a.created_at)));
        Ok(logs)
    }

    async fn insert_work_log(&self, log: WorkLog) -> RepositoryResult<WorkLog> {
        let mut tables = self.tables.write().await;
        if !tables.projects.iter().any(|p| p.id == log.project_id) {
            return Err(RepositoryError::not_found("project", &log.project_id));
        }
        tables.work_logs.push(log.clone());
        Ok(log)
    }
}

#[async_trait]
impl MaterialStore for MemoryStore {
    async fn list_materials(&self) -> RepositoryResult<Vec<Material>> {
        let mut materials = self.tables.read().await.materials.clone();
        materials.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(materials)
    }

    async fn find_material(&self, id: &str) -> RepositoryResult<Option<Material>> {
        let tables = self.tables.read().await;
        Ok(tables.materials.iter().find(|m| m.id == id).cloned())
    }

    async fn find_material_by_name(&self, name: &str) -> RepositoryResult<Option<Material>> {
        let name = name.trim().to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables
            .materials
            .iter()
            .find(|m| m.name.to_lowercase() == name)
            .cloned())
    }

    async fn insert_material(&self, material: Material) -> RepositoryResult<Material> {
        let mut tables = self.tables.write().await;
        let name = material.name.to_lowercase();
        if tables
            .materials
            .iter()
            .any(|m| m.id == material.id || m.name.to_lowercase() == name)
        {
            return Err(RepositoryError::Conflict(
                "a material with this name already exists".into(),
            ));
        }
        tables.materials.push(material.clone());
        Ok(material)
    }

    async fn record_movement(
        &self,
        movement: MaterialMovement,
        expected_version: i32,
    ) -> RepositoryResult<Material> {
        let mut tables = self.tables.write().await;

        let material = tables
            .materials
            .iter_mut()
            .find(|m| m.id == movement.material_id)
            .ok_or_else(|| RepositoryError::not_found("material", &movement.material_id))?;

        if material.lock_version != expected_version {
            return Err(RepositoryError::Conflict(format!(
                "material {} was modified concurrently",
                material.name
            )));
        }

        match movement.kind {
            MovementKind::Usage => material.apply_usage(movement.quantity).map_err(|e| match e {
                TrackerError::InsufficientStock {
                    material,
                    requested,
                    remaining,
                } => RepositoryError::InsufficientStock {
                    material,
                    requested,
                    remaining,
                },
                other => RepositoryError::Validation(other.to_string()),
            })?,
            MovementKind::Delivery => material.apply_delivery(movement.quantity, movement.date),
        }

        let updated = material.clone();
        tables.movements.push(movement);
        Ok(updated)
    }

    async fn list_movements(&self) -> RepositoryResult<Vec<MaterialMovement>> {
        let mut movements = self.tables.read().await.movements.clone();
        movements.sort_by(|a, b| (b.date, b.created_at).cmp(&(a.date, a.created_at)));
        Ok(movements)
    }
}

#[async_trait]
impl MaterialRequestStore for MemoryStore {
    async fn list_material_requests(&self) -> RepositoryResult<Vec<MaterialRequest>> {
        let tables = self.tables.read().await;
        let mut requests: Vec<MaterialRequest> =
            tables.material_requests.iter().rev().cloned().collect();
        requests.sort_by(|a, b| b.request_date.cmp(&a.request_date));
        Ok(requests)
    }

    async fn find_material_request(&self, id: &str) -> RepositoryResult<Option<MaterialRequest>> {
        let tables = self.tables.read().await;
        Ok(tables.material_requests.iter().find(|r| r.id == id).cloned())
    }

    async fn insert_material_request(&self, request: MaterialRequest) -> RepositoryResult<MaterialRequest> {
        let mut tables = self.tables.write().await;
        if tables.material_requests.iter().any(|r| r.id == request.id) {
            return Err(RepositoryError::Conflict("material request already exists".into()));
        }
        tables.material_requests.push(request.clone());
        Ok(request)
    }

    async fn transition_material_request(
        &self,
        updated: MaterialRequest,
        expected: RequestStatus,
    ) -> RepositoryResult<MaterialRequest> {
        let mut tables = self.tables.write().await;
        let stored = tables
            .material_requests
            .iter_mut()
            .find(|r| r.id == updated.id)
            .ok_or_else(|| RepositoryError::not_found("material request", &updated.id))?;

        if stored.status != expected {
            return Err(RepositoryError::Conflict(format!(
                "request {} is already {}",
                stored.id, stored.status
            )));
        }
        *stored = updated.clone();
        Ok(updated)
    }
}

#[async_trait]
impl ResetTokenStore for MemoryStore {
    async fn insert_reset_token(&self, token: PasswordResetToken) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        tables.reset_tokens.insert(token.digest.clone(), token);
        Ok(())
    }

    async fn take_reset_token(&self, digest: &str) -> RepositoryResult<Option<PasswordResetToken>> {
        Ok(self.tables.write().await.reset_tokens.remove(digest))
    }

    async fn delete_reset_tokens_for(&self, user_id: &str) -> RepositoryResult<()> {
        let mut tables = self.tables.write().await;
        tables.reset_tokens.retain(|_, t| t.user_id != user_id);
        Ok(())
    }
}
