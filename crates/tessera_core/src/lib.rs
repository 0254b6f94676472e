//! TESSERA Core Types
//!
//! Commands, sequenced records and the line-oriented codec shared by the
//! log writer, the dispatch engine and the replay tooling.
//! This crate performs no I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod command;
pub mod error;
pub mod record;

// Re-exports
pub use command::{Command, DELIMITER};
pub use error::{CoreError, CoreResult};
pub use record::{Direction, RecordBody, SequencedRecord, split_sequence_field};
