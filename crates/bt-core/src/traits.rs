//! Core traits shared by the domain entities

/// Primary key type. Records carry the readable string ids of the
/// seed dataset (`proj-1`, `worker-2`, ...), new ones get UUIDs.
pub type Id = String;

/// Trait for entities that have a primary key
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Trait for entities that belong to a project
pub trait ProjectScoped {
    fn project_id(&self) -> &str;

    fn belongs_to(&self, project_id: &str) -> bool {
        self.project_id() == project_id
    }
}

/// Trait for entities recorded by a single actor (work logs, requests, stock movements)
pub trait Authored {
    fn author_id(&self) -> &str;
}

/// Generate an id for a new record, e.g. `log-5f0c...`
pub fn new_id(prefix: &str) -> Id {
    format!("{}-{}", prefix, uuid::Uuid::new_v4().simple())
}
