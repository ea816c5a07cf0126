//! # Specification Watching
//!
//! Reruns on save. [`start`] watches the directory that holds the
//! specification file (editors often replace a file instead of writing it in
//! place, which a watch on the file itself would miss) and forwards every
//! modify or create event that touches the file to a channel.
//!
//! The watcher runs on a `notify` background thread. The caller owns the
//! returned [`RecommendedWatcher`]; dropping it stops the notifications and
//! closes the channel.

use anyhow::{Context, Result};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher as NotifyWatcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use tracing::{debug, error, info};

/// Start watching `spec`.
///
/// # Errors
///
/// Returns an error if the file does not exist or the watcher cannot be
/// created or attached to its directory.
pub fn start(spec: &Path) -> Result<(RecommendedWatcher, Receiver<PathBuf>)> {
    let target = spec
        .canonicalize()
        .with_context(|| format!("cannot watch {}", spec.display()))?;
    let directory = target
        .parent()
        .map(Path::to_path_buf)
        .context("specification path has no parent directory")?;

    let (tx, rx) = mpsc::channel();
    let mut watcher = create_file_watcher(target.clone(), tx)?;
    watcher
        .watch(&directory, RecursiveMode::NonRecursive)
        .map_err(|e| anyhow::anyhow!("Failed to watch {}: {}", directory.display(), e))?;

    info!("Specification watcher active on {:?}", target.file_name().unwrap_or_default());
    Ok((watcher, rx))
}

fn create_file_watcher(target: PathBuf, tx: Sender<PathBuf>) -> Result<RecommendedWatcher> {
    notify::recommended_watcher(move |result: notify::Result<Event>| match result {
        Ok(event) => {
            if let Some(path) = relevant_path(&event, &target) {
                debug!("Change detected: {:?}", event.kind);
                // The receiver is gone once the app stops watching.
                let _ = tx.send(path);
            }
        }
        Err(e) => error!("File watcher error: {:?}", e),
    })
    .map_err(|e| anyhow::anyhow!("Failed to create file watcher: {}", e))
}

/// The changed path, if `event` is a write to `target`.
fn relevant_path(event: &Event, target: &Path) -> Option<PathBuf> {
    if !event.kind.is_modify() && !event.kind.is_create() {
        return None;
    }
    event
        .paths
        .iter()
        .find(|path| is_target(path, target))
        .cloned()
}

fn is_target(path: &Path, target: &Path) -> bool {
    path == target || (path.file_name().is_some() && path.file_name() == target.file_name())
}
