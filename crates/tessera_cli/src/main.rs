//! TESSERA CLI
//!
//! Records game sessions into sequenced logs, replays them and runs
//! regression checks against saved baselines.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod echo;

use clap::{Parser, Subcommand};
use color_eyre::Result;
use color_eyre::eyre::{WrapErr, bail};
use console::style;
use echo::Echo;
use std::io::Write;
use std::path::{Path, PathBuf};
use tessera_apps::TicTacToe;
use tessera_log::{FsLogStore, LogStore, LogWriter, next_numbered_path, rotate_existing};
use tessera_replay::{
    BaselineStatus, DiffResult, Mismatch, RegressionConfig, RegressionReport, ReplayDriver,
    compare_files, read_script,
};
use tessera_runtime::{Engine, EngineConfig, EngineHandle, EngineSummary, Registry};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "TESSERA - Deterministic event-sourcing harness", long_about = None)]
struct Cli {
    /// Debug-level diagnostics
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a session from a script, or interactively from stdin
    Play {
        /// Command script to run
        script: Option<PathBuf>,
        /// Log file (default: next free session-N.log)
        #[arg(short, long)]
        log: Option<PathBuf>,
        /// Intake queue bound
        #[arg(long, default_value_t = 100)]
        queue_capacity: usize,
    },
    /// Replay a log and compare the result with it
    Replay {
        /// Log to replay
        log: PathBuf,
    },
    /// Compare two logs, ignoring sequence numbers
    Compare {
        /// Original log
        left: PathBuf,
        /// Log to check against it
        right: PathBuf,
    },
    /// Replay every baseline, recording missing ones from scripts first
    Regression {
        /// Baseline directory
        #[arg(long, default_value = "fuzz_baselines")]
        baselines: PathBuf,
        /// Script directory
        #[arg(long, default_value = "fuzz_tests")]
        scripts: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn wiring(registry: &mut Registry<TicTacToe>) {
    registry.register(TicTacToe::new());
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "tessera=debug" } else { "tessera=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Play {
            script,
            log,
            queue_capacity,
        } => play(script, log, queue_capacity).await,
        Commands::Replay { log } => replay(&log).await,
        Commands::Compare { left, right } => compare(&left, &right),
        Commands::Regression {
            baselines,
            scripts,
            json,
        } => {
            let config = RegressionConfig::default()
                .with_baseline_dir(baselines)
                .with_script_dir(scripts);
            regression(&config, json).await
        }
    }
}

/// Start an engine whose log records are mirrored to stdout
fn start_session(path: &Path, queue_capacity: usize) -> Result<EngineHandle> {
    let store = FsLogStore::new();
    rotate_existing(&store, path)?;
    let file = store.create(path)?;
    let writer = LogWriter::from_sink(Echo::new(file, std::io::stdout()), path);

    let config = EngineConfig::default().with_queue_capacity(queue_capacity);
    let mut engine = Engine::with_writer(writer, config);
    wiring(engine.registry_mut());
    Ok(engine.start()?)
}

async fn play(script: Option<PathBuf>, log: Option<PathBuf>, queue_capacity: usize) -> Result<()> {
    let store = FsLogStore::new();
    let script = script
        .map(|script| {
            store
                .read_to_string(&script)
                .map(|content| read_script(&content))
                .wrap_err_with(|| format!("Cannot read script {}", script.display()))
        })
        .transpose()?;

    let log = log.unwrap_or_else(|| next_numbered_path(&store, Path::new(""), "session", "log"));
    let handle = start_session(&log, queue_capacity)?;
    info!(log = %log.display(), "Session started");

    let submitted = match script {
        Some(lines) => submit_script(&handle, lines).await,
        None => interactive(&handle).await,
    };
    let summary = finish_session(handle, submitted).await?;
    println!(
        "{} {} ({} inputs, {} outputs, {} rejected)",
        style("Log written:").green(),
        summary.log_path.display(),
        summary.inputs,
        summary.outputs,
        summary.rejected
    );
    Ok(())
}

async fn submit_script(handle: &EngineHandle, lines: Vec<String>) -> Result<()> {
    for line in lines {
        println!("{} {line}", style("Processing:").dim());
        handle.submit(line).await?;
    }
    Ok(())
}

/// Wait for the processing loop, then report submission trouble.
///
/// A loop that died on a log failure closes its intake; that failure is
/// returned rather than the closed intake.
async fn finish_session(handle: EngineHandle, submitted: Result<()>) -> Result<EngineSummary> {
    let summary = handle.finish().await?;
    submitted?;
    Ok(summary)
}

fn prompt(text: &str) -> Result<()> {
    print!("{text}");
    std::io::stdout().flush()?;
    Ok(())
}

/// Menu loop. Lines containing `|` are submitted verbatim.
async fn interactive(handle: &EngineHandle) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    println!("{}", style("=== Tic Tac Toe ===").cyan().bold());

    loop {
        println!("\nOptions: [n]ew game, [s]how board, [m]ove, [e]nd turn, [q]uit");
        prompt("-> ")?;
        let Some(choice) = lines.next_line().await? else {
            return Ok(());
        };
        let choice = choice.trim();

        let command = match choice {
            "n" | "new" => "ttt|new|".to_string(),
            "s" | "show" => "ttt|show|".to_string(),
            "e" | "endturn" => "ttt|endturn|".to_string(),
            "m" | "move" => {
                prompt("Enter from row, from col, to row, to col (0-2): ")?;
                let Some(coordinates) = lines.next_line().await? else {
                    return Ok(());
                };
                format!("ttt|move|{}", coordinates.trim())
            }
            "q" | "quit" => return Ok(()),
            raw if raw.contains('|') => raw.to_string(),
            _ => {
                println!("{}", style("Invalid option").red());
                continue;
            }
        };
        handle.submit(command).await?;
    }
}

fn describe(diff: &DiffResult) -> String {
    match &diff.mismatch {
        None => "logs are equivalent".to_string(),
        Some(Mismatch::LineCount { original, replay }) => {
            format!("line count differs: {original} vs {replay}")
        }
        Some(Mismatch::Line(divergence)) => format!(
            "line {} differs:\n    - {}\n    + {}",
            divergence.line + 1,
            divergence.original,
            divergence.replay
        ),
    }
}

async fn replay(log: &Path) -> Result<()> {
    let driver = ReplayDriver::new(FsLogStore::new(), wiring);
    let outcome = driver
        .replay_log(log)
        .await
        .wrap_err_with(|| format!("Replay of {} failed", log.display()))?;

    println!("Replayed {} inputs into {}", outcome.inputs, outcome.replay.display());
    if outcome.diff.equivalent {
        println!("  {} - {}", style("PASSED").green().bold(), log.display());
        Ok(())
    } else {
        println!("  {} - {}", style("FAILED").red().bold(), log.display());
        println!("    {}", describe(&outcome.diff));
        bail!("replay of {} differs from the original", log.display())
    }
}

fn compare(left: &Path, right: &Path) -> Result<()> {
    let diff = compare_files(&FsLogStore::new(), left, right)?;
    println!("{}", describe(&diff));
    if diff.equivalent {
        Ok(())
    } else {
        bail!("{} and {} differ", left.display(), right.display())
    }
}

fn print_report(report: &RegressionReport) {
    println!("=== Running Regression Tests ===");
    println!();
    for result in &report.results {
        match &result.status {
            BaselineStatus::Passed => {
                println!("  {} - {}", style("PASSED").green().bold(), result.name);
            }
            BaselineStatus::Failed { mismatch } => {
                println!(
                    "  {} - {} (output differs from original)",
                    style("FAILED").red().bold(),
                    result.name
                );
                let diff = DiffResult {
                    equivalent: false,
                    mismatch: mismatch.clone(),
                };
                println!("    {}", describe(&diff));
            }
            BaselineStatus::Error { reason } => {
                println!(
                    "  {} - Error reading {}: {reason}",
                    style("FAILED").red().bold(),
                    result.name
                );
            }
        }
    }
    println!();
    println!("================================");
    if report.all_passed() {
        println!("{}", style("All regression tests PASSED").green());
    } else {
        println!(
            "{}",
            style(format!(
                "Some regression tests FAILED ({} of {})",
                report.failed_count(),
                report.results.len()
            ))
            .red()
        );
    }
}

async fn regression(config: &RegressionConfig, json: bool) -> Result<()> {
    let driver = ReplayDriver::new(FsLogStore::new(), wiring);
    let baselines = driver.discover_baselines(config).await;
    if baselines.is_empty() {
        info!(scripts = %config.script_dir.display(), "No baselines to check");
    }
    let report = driver.run_regression(&baselines).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if !report.results.is_empty() {
        print_report(&report);
    }

    if report.all_passed() {
        Ok(())
    } else {
        bail!("{} regression baseline(s) failed", report.failed_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::parse_from(["tessera", "play", "game.txt", "--log", "out.log"]);
        assert!(matches!(
            cli.command,
            Commands::Play { script: Some(_), log: Some(_), queue_capacity: 100 }
        ));

        let cli = Cli::parse_from(["tessera", "-v", "regression", "--json"]);
        assert!(cli.verbose);
        match cli.command {
            Commands::Regression { baselines, scripts, json } => {
                assert_eq!(baselines, PathBuf::from("fuzz_baselines"));
                assert_eq!(scripts, PathBuf::from("fuzz_tests"));
                assert!(json);
            }
            _ => panic!("expected regression"),
        }
    }

    #[test]
    fn test_describe_divergence() {
        let diff = tessera_replay::diff_logs("1|I|ttt|new|\n2|O|a\n", "1|I|ttt|new|\n2|O|b\n");
        assert_eq!(describe(&diff), "line 2 differs:\n    - 2|O|a\n    + 2|O|b");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_regression_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let config = RegressionConfig::default()
            .with_script_dir(dir.path().join("fuzz_tests"))
            .with_baseline_dir(dir.path().join("fuzz_baselines"));
        std::fs::create_dir_all(&config.script_dir).unwrap();
        std::fs::write(
            config.script_dir.join("opening.txt"),
            "# opening\nttt|new|\nttt|move|0 0 0 0\nttt|endturn|\nttt|move|1 1 1 1\n",
        )
        .unwrap();

        regression(&config, false).await.unwrap();
        assert!(config.baseline_dir.join("opening.log").exists());
        assert!(config.baseline_dir.join("opening-replay-1.log").exists());

        std::fs::write(
            config.baseline_dir.join("opening.log"),
            "1|I|ttt|new|\n2|O|tampered\n",
        )
        .unwrap();
        assert!(regression(&config, true).await.is_err());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_session_log_is_replayable() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("session-1.log");
        let handle = start_session(&log, 4).unwrap();
        for line in ["ttt|new|", "ttt|move|0 0 0 0", "ttt|show|"] {
            handle.submit(line).await.unwrap();
        }
        let summary = handle.finish().await.unwrap();
        assert_eq!(summary.inputs, 3);

        replay(&log).await.unwrap();
        compare(&log, &dir.path().join("session-1-replay-1.log")).unwrap();
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_session_reports_log_failure() {
        let writer = LogWriter::from_sink(FullDisk, "full.log");
        let config = EngineConfig::default().with_queue_capacity(1);
        let mut engine = Engine::with_writer(writer, config);
        wiring(engine.registry_mut());
        let handle = engine.start().unwrap();

        let lines = (0..50).map(|_| "ttt|show|".to_string()).collect();
        let submitted = submit_script(&handle, lines).await;
        let err = finish_session(handle, submitted).await.unwrap_err();
        assert!(err.to_string().contains("disk full"), "{err}");
    }
}
