//! Dispatch engine.
//!
//! One engine owns one log. Its processing loop takes a line from the
//! intake, parses it and either records a `Bad Input` output, or records
//! the input and hands the command to the application routed for its
//! topic. The application's effects are written before the next line is
//! taken, so the records of one command are never interleaved with those
//! of another.

use crate::application::{Application, Effect, Outbox};
use crate::error::{EngineError, EngineResult};
use crate::intake::{Intake, Submitter, intake_channel};
use crate::registry::Registry;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};
use tessera_core::Command;
use tessera_log::{LogStore, LogWriter};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Prefix of the output recorded for a line that failed to parse
pub const BAD_INPUT_PREFIX: &str = "Bad Input: ";

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Intake queue bound; producers wait when it is reached
    pub queue_capacity: usize,
}

impl EngineConfig {
    /// Set the intake queue bound
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 100,
        }
    }
}

/// Counters for one engine run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineSummary {
    /// Log written by the engine
    pub log_path: PathBuf,
    /// Input records written
    pub inputs: u64,
    /// Output records written, including `Bad Input` reports
    pub outputs: u64,
    /// Lines that failed to parse
    pub rejected: u64,
    /// Commands whose topic had no application
    pub unrouted: u64,
    /// Last sequence number written
    pub last_seq: u64,
}

/// Dispatch engine over a single log
pub struct Engine<A, W> {
    registry: Registry<A>,
    writer: LogWriter<W>,
    config: EngineConfig,
    summary: EngineSummary,
}

impl<A, W> Engine<A, W>
where
    A: Application,
    W: Write + Send + 'static,
{
    /// Create an engine writing to `path`, rotating any existing file.
    ///
    /// # Errors
    ///
    /// Returns error if the configuration is invalid or the log cannot be
    /// created
    pub fn create<S>(store: &S, path: impl AsRef<Path>, config: EngineConfig) -> EngineResult<Self>
    where
        S: LogStore<Handle = W>,
    {
        if config.queue_capacity == 0 {
            return Err(EngineError::InvalidCapacity(config.queue_capacity));
        }
        let writer = LogWriter::open(store, path)?;
        Ok(Self::with_writer(writer, config))
    }

    /// Create an engine around an already opened writer
    #[must_use]
    pub fn with_writer(writer: LogWriter<W>, config: EngineConfig) -> Self {
        let summary = EngineSummary {
            log_path: writer.path().to_path_buf(),
            ..EngineSummary::default()
        };
        Self {
            registry: Registry::new(),
            writer,
            config,
            summary,
        }
    }

    /// Register an application for all of its topics
    pub fn register(&mut self, app: A) -> usize {
        self.registry.register(app)
    }

    /// Topic dispatch table
    #[must_use]
    pub fn registry(&self) -> &Registry<A> {
        &self.registry
    }

    /// Mutable topic dispatch table, for wiring before the loop starts
    pub fn registry_mut(&mut self) -> &mut Registry<A> {
        &mut self.registry
    }

    /// Engine configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Path of the log this engine writes
    #[must_use]
    pub fn log_path(&self) -> &Path {
        self.writer.path()
    }

    /// Append an output record
    ///
    /// # Errors
    ///
    /// Returns error if the append fails
    pub fn emit(&mut self, message: &str) -> EngineResult<u64> {
        let seq = self.writer.write_output(message)?;
        self.summary.outputs += 1;
        Ok(seq)
    }

    fn apply(&mut self, effect: Effect) -> EngineResult<()> {
        match effect {
            Effect::Output(message) => {
                self.emit(&message)?;
            }
        }
        Ok(())
    }

    /// Process one raw line to completion
    ///
    /// # Errors
    ///
    /// Returns error only if the log cannot be appended to
    pub fn process_line(&mut self, line: &str) -> EngineResult<()> {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(err) => {
                debug!(line, error = %err, "Rejected malformed line");
                self.summary.rejected += 1;
                self.emit(&format!("{BAD_INPUT_PREFIX}{line}"))?;
                return Ok(());
            }
        };

        let seq = self.writer.write_input(&command)?;
        self.summary.inputs += 1;

        let effects = match self.registry.route_mut(command.topic()) {
            Some(app) => {
                let mut outbox = Outbox::new();
                app.on_event(&command, &mut outbox);
                outbox.into_effects()
            }
            None => {
                debug!(seq, topic = command.topic(), "No application for topic");
                self.summary.unrouted += 1;
                return Ok(());
            }
        };

        debug!(seq, effects = effects.len(), "Dispatched command");
        for effect in effects {
            self.apply(effect)?;
        }
        Ok(())
    }

    /// Counters so far
    #[must_use]
    pub fn summary(&self) -> EngineSummary {
        EngineSummary {
            last_seq: self.writer.last_seq(),
            ..self.summary.clone()
        }
    }

    /// Drain `intake` on the calling thread until every submitter is gone.
    ///
    /// Blocks between lines; call it from a dedicated thread, not from
    /// inside an async task.
    ///
    /// # Errors
    ///
    /// Returns error if a log append fails; the loop stops at that point
    pub fn run(mut self, mut intake: Intake) -> EngineResult<EngineSummary> {
        info!(
            path = %self.writer.path().display(),
            topics = ?self.registry.topics().collect::<Vec<_>>(),
            "Processing loop started"
        );

        while let Some(line) = intake.next_blocking() {
            if let Err(err) = self.process_line(&line) {
                error!(error = %err, "Log append failed, stopping processing loop");
                return Err(err);
            }
        }

        let summary = self.summary();
        info!(
            path = %summary.log_path.display(),
            inputs = summary.inputs,
            outputs = summary.outputs,
            rejected = summary.rejected,
            unrouted = summary.unrouted,
            "Processing loop finished"
        );
        Ok(summary)
    }

    /// Spawn the processing loop on the Tokio blocking pool.
    ///
    /// # Errors
    ///
    /// Returns error if no Tokio runtime is available or the configured
    /// capacity is invalid
    pub fn start(self) -> EngineResult<EngineHandle> {
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| EngineError::NoRuntime)?;
        let (submitter, intake) = intake_channel(self.config.queue_capacity)?;
        let task = runtime.spawn_blocking(move || self.run(intake));
        Ok(EngineHandle { submitter, task })
    }
}

/// Handle to a running engine
#[derive(Debug)]
pub struct EngineHandle {
    submitter: Submitter,
    task: JoinHandle<EngineResult<EngineSummary>>,
}

impl EngineHandle {
    /// A producer handle for other tasks or threads
    #[must_use]
    pub fn submitter(&self) -> Submitter {
        self.submitter.clone()
    }

    /// Enqueue a raw line, waiting while the queue is full
    ///
    /// # Errors
    ///
    /// Returns error if the processing loop has stopped
    pub async fn submit(&self, line: impl Into<String>) -> EngineResult<()> {
        self.submitter.submit(line).await
    }

    /// Close this handle's intake and wait for the queue to drain.
    ///
    /// Submitters handed out by [`EngineHandle::submitter`] keep the loop
    /// alive until they are dropped too.
    ///
    /// # Errors
    ///
    /// Returns error if the processing loop failed
    pub async fn finish(self) -> EngineResult<EngineSummary> {
        let Self { submitter, task } = self;
        drop(submitter);
        match task.await {
            Ok(result) => result,
            Err(err) => Err(EngineError::Join {
                reason: err.to_string(),
            }),
        }
    }
}
