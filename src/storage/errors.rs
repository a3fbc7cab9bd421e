//! Storage collaborator errors

use thiserror::Error;

/// Result type for repository operations
pub type StorageResult<T> = Result<T, StorageError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Referenced entity does not exist
    #[error("{entity} with ID {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    /// Unique constraint violated
    #[error("{0}")]
    Conflict(String),

    /// Anything the backend could not complete
    #[error("storage backend failure: {0}")]
    Backend(String),
}

impl StorageError {
    pub fn not_found(entity: &'static str, id: i64) -> Self {
        Self::NotFound { entity, id }
    }

    pub(crate) fn poisoned() -> Self {
        Self::Backend("lock poisoned".to_string())
    }
}
