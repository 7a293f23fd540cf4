use crate::types::DbId;

/// Domain-level error taxonomy shared by every layer.
///
/// Every catalog operation either yields its result or exactly one of these
/// kinds. `Validation`, `Conflict`, and `NotFound` are detected before any
/// mutation and are safe to retry with corrected input; `Storage` surfaces an
/// underlying persistence failure and is not retried automatically.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}
