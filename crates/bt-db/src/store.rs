//! Store traits
//!
//! Services depend on these traits only. `PgStore` and `MemoryStore` both
//! implement every one of them, and therefore [`Store`].

use async_trait::async_trait;
use bt_models::{
    Material, MaterialMovement, MaterialRequest, Project, RequestStatus, Supplier, User,
    UserPreferences, WorkLog, Worker,
};
use chrono::{DateTime, Utc};

use crate::repository::RepositoryResult;

/// Directory entry created alongside an account
#[derive(Debug, Clone, PartialEq)]
pub enum DirectoryProfile {
    Worker(Worker),
    Supplier(Supplier),
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: &str) -> RepositoryResult<Option<User>>;

    /// Lookup by normalized (lowercase) email
    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;

    async fn count_users(&self) -> RepositoryResult<i64>;

    /// Fails with `Conflict` when the email is taken
    async fn insert_user(&self, user: User) -> RepositoryResult<User>;

    /// Insert a user together with its directory profile; neither is kept
    /// if either insert fails
    async fn insert_account(&self, user: User, profile: Option<DirectoryProfile>) -> RepositoryResult<User>;

    async fn update_password_hash(&self, id: &str, password_hash: &str) -> RepositoryResult<()>;

    async fn update_preferences(&self, id: &str, preferences: UserPreferences) -> RepositoryResult<User>;
}

#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn list_projects(&self) -> RepositoryResult<Vec<Project>>;

    async fn find_project(&self, id: &str) -> RepositoryResult<Option<Project>>;

    async fn insert_project(&self, project: Project) -> RepositoryResult<Project>;

    /// Replace every attribute of an existing project
    async fn update_project(&self, project: Project) -> RepositoryResult<Project>;
}

/// Worker profiles and suppliers
#[async_trait]
pub trait DirectoryStore: Send + Sync {
    /// `projects_assigned` is filled from the projects' assignment lists
    async fn list_workers(&self) -> RepositoryResult<Vec<Worker>>;

    async fn find_worker(&self, id: &str) -> RepositoryResult<Option<Worker>>;

    async fn insert_worker(&self, worker: Worker) -> RepositoryResult<Worker>;

    async fn list_suppliers(&self) -> RepositoryResult<Vec<Supplier>>;

    async fn insert_supplier(&self, supplier: Supplier) -> RepositoryResult<Supplier>;
}

#[async_trait]
pub trait WorkLogStore: Send + Sync {
    /// Newest first
    async fn list_work_logs(&self) -> RepositoryResult<Vec<WorkLog>>;

    async fn insert_work_log(&self, log: WorkLog) -> RepositoryResult<WorkLog>;
}

#[async_trait]
pub trait MaterialStore: Send + Sync {
    async fn list_materials(&self) -> RepositoryResult<Vec<Material>>;

    async fn find_material(&self, id: &str) -> RepositoryResult<Option<Material>>;

    /// Case-insensitive name lookup
    async fn find_material_by_name(&self, name: &str) -> RepositoryResult<Option<Material>>;

    async fn insert_material(&self, material: Material) -> RepositoryResult<Material>;

    /// Apply `movement` to its material and record it, atomically.
    ///
    /// The material is changed only if its `lock_version` still equals
    /// `expected_version` (`Conflict` otherwise) and, for usage, only if
    /// enough stock remains (`InsufficientStock` otherwise). Returns the
    /// updated material.
    async fn record_movement(
        &self,
        movement: MaterialMovement,
        expected_version: i32,
    ) -> RepositoryResult<Material>;

    /// Newest first
    async fn list_movements(&self) -> RepositoryResult<Vec<MaterialMovement>>;
}

#[async_trait]
pub trait MaterialRequestStore: Send + Sync {
    /// Newest first
    async fn list_material_requests(&self) -> RepositoryResult<Vec<MaterialRequest>>;

    async fn find_material_request(&self, id: &str) -> RepositoryResult<Option<MaterialRequest>>;

    async fn insert_material_request(&self, request: MaterialRequest) -> RepositoryResult<MaterialRequest>;

    /// Store `updated` only if the stored request is still in `expected`
    /// status; `Conflict` otherwise.
    async fn transition_material_request(
        &self,
        updated: MaterialRequest,
        expected: RequestStatus,
    ) -> RepositoryResult<MaterialRequest>;
}

/// A pending password reset. Only the digest of the token is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetToken {
    pub digest: String,
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

impl PasswordResetToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[async_trait]
pub trait ResetTokenStore: Send + Sync {
    async fn insert_reset_token(&self, token: PasswordResetToken) -> RepositoryResult<()>;

    /// Remove and return the token with this digest; a token can be taken
    /// once
    async fn take_reset_token(&self, digest: &str) -> RepositoryResult<Option<PasswordResetToken>>;

    async fn delete_reset_tokens_for(&self, user_id: &str) -> RepositoryResult<()>;
}

/// Everything the services need from persistence
pub trait Store:
    UserStore
    + ProjectStore
    + DirectoryStore
    + WorkLogStore
    + MaterialStore
    + MaterialRequestStore
    + ResetTokenStore
{
}

impl<T> Store for T where
    T: UserStore
        + ProjectStore
        + DirectoryStore
        + WorkLogStore
        + MaterialStore
        + MaterialRequestStore
        + ResetTokenStore
{
}
