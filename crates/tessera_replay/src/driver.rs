//! Replay driver.
//!
//! Replays go through exactly the same engine, sequencer and log writer
//! as the original recording; only the application instances are fresh.

use crate::diff::{DiffResult, compare_files};
use crate::error::ReplayResult;
use crate::extract::extract_inputs_from;
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use tessera_log::{LogStore, next_numbered_path};
use tessera_runtime::{Application, Engine, EngineConfig, EngineSummary, Registry};
use tracing::{debug, info};

/// Replay driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Inserted between a log's stem and the replay number
    pub replay_suffix: String,
    /// Configuration of every engine the driver creates
    pub engine: EngineConfig,
}

impl ReplayConfig {
    /// Set the replay suffix
    #[must_use]
    pub fn with_replay_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.replay_suffix = suffix.into();
        self
    }

    /// Set the engine configuration
    #[must_use]
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            replay_suffix: "replay".to_string(),
            engine: EngineConfig::default(),
        }
    }
}

/// Result of replaying one log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayOutcome {
    /// The log that was replayed
    pub original: PathBuf,
    /// The log written by the replay
    pub replay: PathBuf,
    /// Number of inputs re-submitted
    pub inputs: usize,
    /// Counters of the replay engine
    pub summary: EngineSummary,
    /// Comparison of original and replay
    pub diff: DiffResult,
}

/// Builds fresh engines and feeds them recorded inputs.
///
/// `wiring` registers a fresh set of applications on each new engine.
pub struct ReplayDriver<S, A, F> {
    store: S,
    wiring: F,
    config: ReplayConfig,
    _app: PhantomData<fn() -> A>,
}

impl<S, A, F> ReplayDriver<S, A, F>
where
    S: LogStore,
    A: Application,
    F: Fn(&mut Registry<A>),
{
    /// Create a driver over `store`
    #[must_use]
    pub fn new(store: S, wiring: F) -> Self {
        Self {
            store,
            wiring,
            config: ReplayConfig::default(),
            _app: PhantomData,
        }
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: ReplayConfig) -> Self {
        self.config = config;
        self
    }

    /// Store the driver reads and writes logs in
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Driver configuration
    #[must_use]
    pub fn config(&self) -> &ReplayConfig {
        &self.config
    }

    /// Next unused replay path next to `original`, e.g.
    /// `baselines/tie-replay-3.log` for `baselines/tie.log`
    #[must_use]
    pub fn replay_path(&self, original: &Path) -> PathBuf {
        let dir = original.parent().unwrap_or_else(|| Path::new(""));
        let stem = original
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = original
            .extension()
            .map_or_else(|| "log".to_string(), |e| e.to_string_lossy().into_owned());
        next_numbered_path(
            &self.store,
            dir,
            &format!("{stem}-{}", self.config.replay_suffix),
            &extension,
        )
    }

    /// Run `inputs` in order through a fresh engine logging to `path`.
    ///
    /// Waits until every input has been processed and logged.
    ///
    /// # Errors
    ///
    /// Returns error if the engine cannot be created or fails while running.
    /// A loop that stopped on a log failure reports that failure, not the
    /// closed intake seen by later submissions.
    pub async fn record(&self, inputs: &[String], path: &Path) -> ReplayResult<EngineSummary> {
        let mut engine = Engine::create(&self.store, path, self.config.engine.clone())?;
        (self.wiring)(engine.registry_mut());

        let handle = engine.start()?;
        let mut submitted = Ok(());
        for input in inputs {
            if let Err(err) = handle.submit(input.as_str()).await {
                submitted = Err(err);
                break;
            }
        }
        let summary = handle.finish().await?;
        submitted?;
        debug!(
            path = %path.display(),
            inputs = inputs.len(),
            last_seq = summary.last_seq,
            "Recorded inputs"
        );
        Ok(summary)
    }

    /// Replay the inputs of `original` into a new log and compare the two
    ///
    /// # Errors
    ///
    /// Returns error if a log cannot be read or the replay engine fails
    pub async fn replay_log(&self, original: &Path) -> ReplayResult<ReplayOutcome> {
        let inputs = extract_inputs_from(&self.store, original)?;
        let replay = self.replay_path(original);
        info!(
            original = %original.display(),
            replay = %replay.display(),
            inputs = inputs.len(),
            "Replaying log"
        );

        let summary = self.record(&inputs, &replay).await?;
        let diff = compare_files(&self.store, original, &replay)?;
        Ok(ReplayOutcome {
            original: original.to_path_buf(),
            replay,
            inputs: inputs.len(),
            summary,
            diff,
        })
    }
}
