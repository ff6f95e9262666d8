pub use crate::storage::StorageError;

/// Failure taxonomy for store operations.
///
/// `Validation` and `NotFound` are expected failure paths: operations report
/// them as a falsy/`None` result (and, where the store has one, a last-error
/// field) rather than propagating. `Storage` wraps substrate failures, which
/// are logged and swallowed by the stores; in-memory state is not rolled
/// back on a failed durable write.
#[derive(Debug, thiserror::Error)]
pub enum HubError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl HubError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}
