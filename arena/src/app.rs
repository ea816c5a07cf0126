//! # Arena Application Logic
//!
//! Command-line surface and orchestration for the `arena` binary.
//!
//! [`run`] installs logging, executes one batch of rollouts against the
//! specification file and writes the JSON result. When `--watch` is given it
//! then blocks on [`crate::watcher`] and reruns the batch every time the file
//! is saved. A specification that fails to load or validate during watching
//! is reported and the watcher keeps going, so the file can be fixed in place.

use anyhow::{Context, Result};
use clap::Parser;
use envspec::EnvSpec;
use sim::{run_batch, BatchResult, Policy, RolloutConfig, TerminationReason};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

use crate::watcher;

/// Quiet period after a change event before rerunning. Editors tend to emit
/// several events per save.
const DEBOUNCE: Duration = Duration::from_millis(150);

#[derive(Debug, Clone, Parser)]
#[command(name = "arena", version, about = "Run rollouts of a declarative 2D environment")]
pub struct Args {
    /// Path to the JSON environment specification.
    pub spec: PathBuf,

    /// Built-in policy: `greedy` or `random`.
    #[arg(long, default_value_t = Policy::Greedy)]
    pub policy: Policy,

    /// Step budget per episode.
    #[arg(long, default_value_t = 200)]
    pub max_steps: usize,

    #[arg(long, default_value_t = 1)]
    pub episodes: usize,

    /// Run seed. Episode `i` uses a seed derived from `(seed, i)`.
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Write the JSON result here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Emit only the batch summary.
    #[arg(long)]
    pub summary: bool,

    /// Rerun whenever the specification file changes.
    #[arg(long)]
    pub watch: bool,

    /// Log verbosity (`error`, `warn`, `info`, `debug`, `trace`).
    #[arg(long, default_value = "info")]
    pub log_level: Level,
}

impl Args {
    #[must_use]
    pub fn rollout_config(&self) -> RolloutConfig {
        RolloutConfig {
            policy: self.policy,
            max_steps: self.max_steps,
            episodes: self.episodes,
            seed: self.seed,
        }
    }
}

/// Run the application described by `args`.
///
/// # Errors
///
/// Returns an error if the specification cannot be loaded on the first run,
/// if the result cannot be written, or if the file watcher fails to start.
pub fn run(args: &Args) -> Result<()> {
    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = args.rollout_config();
    execute(args, &config)?;

    if args.watch {
        watch(args, &config)?;
    }
    Ok(())
}

fn execute(args: &Args, config: &RolloutConfig) -> Result<()> {
    let batch = run_once(&args.spec, config)?;
    emit(&batch, args.summary, args.output.as_deref())
}

fn watch(args: &Args, config: &RolloutConfig) -> Result<()> {
    let (_watcher, changes) = watcher::start(&args.spec)?;
    tracing::info!("Watching {} for changes (Ctrl-C to stop)", args.spec.display());

    while changes.recv().is_ok() {
        // Collapse the burst of events a single save produces.
        while changes.recv_timeout(DEBOUNCE).is_ok() {}

        tracing::info!("Specification changed, rerunning...");
        if let Err(e) = execute(args, config) {
            tracing::error!("Rerun failed: {e:#}");
        }
    }
    Ok(())
}

/// Load the specification at `path` and run a batch of rollouts on it.
///
/// A specification that parses but fails validation is not an error here:
/// every episode comes back with zero steps and an `invalid` termination
/// reason carrying the validation message.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not a valid
/// specification document.
pub fn run_once(path: &Path, config: &RolloutConfig) -> Result<BatchResult> {
    let spec = EnvSpec::from_path(path)?;
    tracing::info!(
        "Loaded {} ({} agents, {} objects), running {} episode(s) with the {} policy",
        path.display(),
        spec.agents.len(),
        spec.objects.len(),
        config.episodes,
        config.policy
    );

    let batch = run_batch(&spec, config);
    if let Some(TerminationReason::Invalid { error }) = batch
        .episodes
        .first()
        .and_then(|r| r.termination_reason.as_ref())
    {
        tracing::error!("Specification is invalid: {error}");
    }
    Ok(batch)
}

/// Serialize `batch`, or only its summary, as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render(batch: &BatchResult, summary_only: bool) -> Result<String> {
    let json = if summary_only {
        serde_json::to_string_pretty(&batch.summary)?
    } else {
        serde_json::to_string_pretty(batch)?
    };
    Ok(json)
}

fn emit(batch: &BatchResult, summary_only: bool, output: Option<&Path>) -> Result<()> {
    let json = render(batch, summary_only)?;
    match output {
        Some(path) => {
            std::fs::write(path, json + "\n")
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("Wrote results to {}", path.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}
