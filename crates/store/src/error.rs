use domain::{ActionError, DomainError};
use thiserror::Error;

/// Errors that can occur when interacting with a repository.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record matched the id (and, for transitions, the expected status).
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A database error occurred.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A serialization/deserialization error occurred.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row could not be mapped back to a record.
    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        StoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Maps an illegal transition onto the conditional-update miss it represents.
    pub fn from_transition(entity: &'static str, id: impl ToString, err: ActionError) -> Self {
        tracing::debug!(entity, error = %err, "transition rejected");
        Self::not_found(entity, id)
    }
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, .. } => DomainError::not_found(entity),
            other => DomainError::ServiceUnavailable(other.to_string()),
        }
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StoreError>;
