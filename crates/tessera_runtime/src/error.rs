//! Engine errors.

use tessera_log::LogError;

/// Engine result type
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the dispatch engine
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Log could not be created or appended to
    #[error(transparent)]
    Log(#[from] LogError),

    /// Intake queue capacity must be at least one
    #[error("Invalid intake capacity: {0}")]
    InvalidCapacity(usize),

    /// The processing loop is gone and no longer accepts input
    #[error("Engine intake closed")]
    Closed,

    /// Starting the engine requires a Tokio runtime
    #[error("No Tokio runtime available to host the processing loop")]
    NoRuntime,

    /// The processing loop terminated abnormally
    #[error("Processing loop failed: {reason}")]
    Join {
        /// Join failure description
        reason: String,
    },
}
