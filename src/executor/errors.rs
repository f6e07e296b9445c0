use thiserror::Error;

use super::BatchOperation;

/// Engine-reported failure text, passed through unmodified.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{0}")]
pub struct EngineError(pub String);

#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("Batch {operation} on entity '{entity}' failed: {source}")]
    BatchExecution {
        entity: String,
        operation: BatchOperation,
        source: EngineError,
    },

    #[error("Batch {operation} on entity '{entity}' was cancelled before completion")]
    Cancelled {
        entity: String,
        operation: BatchOperation,
    },
}
