//! Regression runs over baseline logs.
//!
//! Each command script under the script directory owns one baseline log
//! named after the script. Missing baselines are recorded from their
//! script once; every run replays each baseline and compares.

use crate::diff::Mismatch;
use crate::driver::ReplayDriver;
use crate::extract::read_script;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tessera_log::LogStore;
use tessera_runtime::{Application, Registry};
use tracing::{info, warn};

/// Where scripts and baselines live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegressionConfig {
    /// Directory holding baseline logs
    pub baseline_dir: PathBuf,
    /// Directory holding command scripts
    pub script_dir: PathBuf,
    /// Extension of command scripts
    pub script_extension: String,
    /// Extension of baseline logs
    pub log_extension: String,
}

impl RegressionConfig {
    /// Set the baseline directory
    #[must_use]
    pub fn with_baseline_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.baseline_dir = dir.into();
        self
    }

    /// Set the script directory
    #[must_use]
    pub fn with_script_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.script_dir = dir.into();
        self
    }

    /// Baseline path for a script
    #[must_use]
    pub fn baseline_for(&self, script: &Path) -> PathBuf {
        let stem = script
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.baseline_dir
            .join(format!("{stem}.{}", self.log_extension))
    }
}

impl Default for RegressionConfig {
    fn default() -> Self {
        Self {
            baseline_dir: PathBuf::from("fuzz_baselines"),
            script_dir: PathBuf::from("fuzz_tests"),
            script_extension: "txt".to_string(),
            log_extension: "log".to_string(),
        }
    }
}

/// Verdict for one baseline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BaselineStatus {
    /// Replay is equivalent to the baseline
    Passed,
    /// Replay differs from the baseline
    Failed {
        /// First difference found
        mismatch: Option<Mismatch>,
    },
    /// Baseline could not be replayed or compared
    Error {
        /// What went wrong
        reason: String,
    },
}

impl BaselineStatus {
    /// Whether this is a pass
    #[must_use]
    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }
}

/// Result for one baseline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaselineResult {
    /// Baseline file name
    pub name: String,
    /// Baseline path
    pub baseline: PathBuf,
    /// Replay log, if one was written
    pub replay: Option<PathBuf>,
    /// Verdict
    pub status: BaselineStatus,
}

/// Results of a whole regression run, in baseline order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegressionReport {
    /// Per baseline results
    pub results: Vec<BaselineResult>,
}

impl RegressionReport {
    /// Number of passing baselines
    #[must_use]
    pub fn passed_count(&self) -> usize {
        self.results.iter().filter(|r| r.status.is_passed()).count()
    }

    /// Number of failing or erroring baselines
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.results.len() - self.passed_count()
    }

    /// True when every baseline passed. An empty run passes.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed_count() == 0
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl<S, A, F> ReplayDriver<S, A, F>
where
    S: LogStore,
    A: Application,
    F: Fn(&mut Registry<A>),
{
    /// Baseline logs for every script, recording any that are missing.
    ///
    /// Returns an empty list when the script directory does not exist.
    /// Scripts that cannot be read or recorded are skipped with a warning.
    pub async fn discover_baselines(&self, config: &RegressionConfig) -> Vec<PathBuf> {
        let store = self.store();
        if !store.exists(&config.script_dir) {
            return Vec::new();
        }
        if let Err(err) = store.create_dir_all(&config.baseline_dir) {
            warn!(error = %err, "Cannot create baseline directory");
            return Vec::new();
        }

        let scripts = match store.list(&config.script_dir, &config.script_extension) {
            Ok(scripts) => scripts,
            Err(err) => {
                warn!(error = %err, "Cannot list scripts");
                return Vec::new();
            }
        };

        let mut baselines = Vec::with_capacity(scripts.len());
        for script in scripts {
            let baseline = config.baseline_for(&script);
            if !store.exists(&baseline) {
                info!(
                    baseline = %baseline.display(),
                    script = %script.display(),
                    "Creating baseline"
                );
                let inputs = match store.read_to_string(&script) {
                    Ok(content) => read_script(&content),
                    Err(err) => {
                        warn!(
                            script = %script.display(),
                            error = %err,
                            "Skipping unreadable script"
                        );
                        continue;
                    }
                };
                if let Err(err) = self.record(&inputs, &baseline).await {
                    warn!(script = %script.display(), error = %err, "Failed to record baseline");
                    continue;
                }
            }
            baselines.push(baseline);
        }
        baselines
    }

    /// Replay and compare every baseline.
    ///
    /// One failing baseline does not stop the run. Baselines that no
    /// longer exist are skipped.
    pub async fn run_regression(&self, baselines: &[PathBuf]) -> RegressionReport {
        let mut report = RegressionReport::default();
        for baseline in baselines {
            if !self.store().exists(baseline) {
                warn!(baseline = %baseline.display(), "Skipping missing baseline");
                continue;
            }

            let result = match self.replay_log(baseline).await {
                Ok(outcome) => BaselineResult {
                    name: file_name(baseline),
                    baseline: baseline.clone(),
                    replay: Some(outcome.replay),
                    status: if outcome.diff.equivalent {
                        BaselineStatus::Passed
                    } else {
                        BaselineStatus::Failed {
                            mismatch: outcome.diff.mismatch,
                        }
                    },
                },
                Err(err) => BaselineResult {
                    name: file_name(baseline),
                    baseline: baseline.clone(),
                    replay: None,
                    status: BaselineStatus::Error {
                        reason: err.to_string(),
                    },
                },
            };
            info!(
                baseline = %result.name,
                passed = result.status.is_passed(),
                "Baseline checked"
            );
            report.results.push(result);
        }
        report
    }
}
