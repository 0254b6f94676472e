//! Replay errors.

use tessera_log::LogError;
use tessera_runtime::EngineError;

/// Replay result type
pub type ReplayResult<T> = Result<T, ReplayError>;

/// Errors raised while replaying or comparing logs
#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    /// Reading or writing a log failed
    #[error(transparent)]
    Log(#[from] LogError),

    /// The replay engine failed
    #[error(transparent)]
    Engine(#[from] EngineError),
}
