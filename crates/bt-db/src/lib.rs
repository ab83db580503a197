//! # bt-db
//!
//! Persistence layer for BuildTrack.
//!
//! - `store` - Async store traits the services are written against
//! - `PgStore` - PostgreSQL implementation (SQLx), schema in `migrations/`
//! - `MemoryStore` - In-process implementation for tests and database-less runs
//! - `seed` - Loads the demo dataset into an empty store
//!
//! Stock changes and request transitions are single conditional writes:
//! a material is updated only at the `lock_version` the caller read, and a
//! request only from the status the caller saw.
//!
//! ## Example
//!
//! ```ignore
//! use bt_db::{Database, PgStore};
//!
//! let db = Database::connect(&config.database).await?;
//! db.migrate().await?;
//! let store = PgStore::new(db.pool().clone());
//! let projects = store.list_projects().await?;
//! ```

pub mod pool;
pub mod repository;
pub mod store;
pub mod users;
pub mod projects;
pub mod directory;
pub mod work_logs;
pub mod materials;
pub mod material_requests;
pub mod reset_tokens;
pub mod memory;
pub mod seed;

pub use pool::{Database, PoolStats};
pub use repository::{RepositoryError, RepositoryResult};
pub use store::{
    DirectoryProfile, DirectoryStore, MaterialRequestStore, MaterialStore, PasswordResetToken, ProjectStore,
    ResetTokenStore, Store, UserStore, WorkLogStore,
};
pub use memory::MemoryStore;
pub use seed::seed_demo_data;

use sqlx::PgPool;

/// Store backed by PostgreSQL
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
