//! Core error types for TESSERA.

/// Core result type
pub type CoreResult<T> = Result<T, CoreError>;

/// Core error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Line did not split into exactly topic, action and payload
    #[error("Malformed command: {line:?}")]
    MalformedCommand {
        /// The raw line as submitted
        line: String,
    },

    /// Topic or action contains the field delimiter
    #[error("Field {field} must not contain the delimiter: {value:?}")]
    DelimiterInField {
        /// Name of the offending field
        field: &'static str,
        /// Offending value
        value: String,
    },

    /// Log line is not a valid sequenced record
    #[error("Malformed record {line:?}: {reason}")]
    MalformedRecord {
        /// The raw log line
        line: String,
        /// What was wrong with it
        reason: String,
    },
}
