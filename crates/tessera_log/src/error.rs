//! Log and store errors.

use std::io;
use std::path::PathBuf;

/// Log result type
pub type LogResult<T> = Result<T, LogError>;

/// Errors raised while creating, rotating or appending to a log
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    /// Underlying I/O failure
    #[error("Failed to {op} {}: {source}", path.display())]
    Io {
        /// Operation that failed
        op: &'static str,
        /// Path involved
        path: PathBuf,
        /// Source error
        #[source]
        source: io::Error,
    },

    /// Entry does not exist in the store
    #[error("Log not found: {}", path.display())]
    NotFound {
        /// Missing path
        path: PathBuf,
    },

    /// No free rotation suffix was left
    #[error("No free rotation slot for {}", path.display())]
    RotationExhausted {
        /// Path that could not be rotated
        path: PathBuf,
    },

    /// The sequence counter reached its limit
    #[error("Sequence numbers exhausted")]
    SequenceExhausted,

    /// An in-memory store lock was poisoned
    #[error("Log store lock poisoned")]
    Poisoned,
}

impl LogError {
    /// Wrap an I/O error with context
    #[must_use]
    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_display() {
        let err = LogError::io(
            "create",
            "logs/a.log",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        let s = err.to_string();
        assert!(s.contains("create"));
        assert!(s.contains("logs/a.log"));
        assert!(s.contains("denied"));
    }

    #[test]
    fn test_not_found_display() {
        let err = LogError::NotFound {
            path: PathBuf::from("x.log"),
        };
        assert_eq!(err.to_string(), "Log not found: x.log");
    }
}
