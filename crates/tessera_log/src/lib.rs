//! TESSERA Record Log
//!
//! Sequencing and durable, append-only storage of input/output records.
//! Storage is reached through the [`LogStore`] capability so the same
//! writer runs against the filesystem or an in-memory store.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod rotation;
pub mod sequencer;
pub mod store;
pub mod writer;

pub use error::{LogError, LogResult};
pub use rotation::{MAX_NUMBERED_SCAN, next_numbered_path, rotate_existing, rotated_path};
pub use sequencer::Sequencer;
pub use store::{FsLogStore, LogStore, MemoryHandle, MemoryLogStore};
pub use writer::LogWriter;
