//! Repository errors

use bt_core::error::TrackerError;

/// Error type for repository operations
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A stored value could not be mapped back onto the model
    #[error("Invalid stored data: {0}")]
    Validation(String),

    /// The row changed since the caller read it, or a unique key is taken
    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Insufficient stock for {material}: requested {requested}, remaining {remaining}")]
    InsufficientStock {
        material: String,
        requested: f64,
        remaining: f64,
    },
}

/// Result type for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    pub fn not_found(entity: &str, id: &str) -> Self {
        RepositoryError::NotFound(format!("{} {}", entity, id))
    }

    /// Map a unique-key violation onto `Conflict`, pass anything else through
    pub(crate) fn from_insert(err: sqlx::Error, what: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Conflict(format!("{} already exists", what))
            }
            _ => RepositoryError::Database(err),
        }
    }
}

impl From<RepositoryError> for TrackerError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound(what) => TrackerError::NotFound {
                entity: "record",
                field: "id",
                value: what,
            },
            RepositoryError::Conflict(message) => TrackerError::Conflict { message },
            RepositoryError::InsufficientStock {
                material,
                requested,
                remaining,
            } => TrackerError::InsufficientStock {
                material,
                requested,
                remaining,
            },
            RepositoryError::Validation(message) => TrackerError::Internal(message),
            RepositoryError::Database(e) => TrackerError::Database(e.to_string()),
        }
    }
}
