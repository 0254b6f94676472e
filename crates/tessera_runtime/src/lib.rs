//! TESSERA Runtime
//!
//! The dispatch engine: a bounded intake queue drained by a single
//! processing context that logs every input, routes it to the registered
//! application and logs whatever the application emits.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod application;
pub mod engine;
pub mod error;
pub mod intake;
pub mod registry;

pub use application::{Application, Effect, Outbox};
pub use engine::{BAD_INPUT_PREFIX, Engine, EngineConfig, EngineHandle, EngineSummary};
pub use error::{EngineError, EngineResult};
pub use intake::{Intake, Submitter, intake_channel};
pub use registry::Registry;
