//! TESSERA Replay
//!
//! Re-runs the input records of a saved log through a fresh engine and
//! checks that the new log matches the old one line for line, ignoring
//! sequence numbers.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod diff;
pub mod driver;
pub mod error;
pub mod extract;
pub mod regression;

pub use diff::{DiffResult, Divergence, Mismatch, compare, compare_files, diff_logs};
pub use driver::{ReplayConfig, ReplayDriver, ReplayOutcome};
pub use error::{ReplayError, ReplayResult};
pub use extract::{extract_inputs, extract_inputs_from, read_script};
pub use regression::{BaselineResult, BaselineStatus, RegressionConfig, RegressionReport};
