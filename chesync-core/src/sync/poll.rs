//! Polling watch source for git files below the projects root

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use globset::{Glob, GlobSet, GlobSetBuilder};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};
use walkdir::WalkDir;

use super::watch::{WatchEvent, WatchEventKind, WatchHandle};
use crate::config::WatchConfig;
use crate::{Error, Result};

/// Files inside `.git` that can be tracked
const GIT_FILES: [&str; 2] = ["HEAD", "config"];

/// Modification time and size of a watched file
type Fingerprint = (Option<SystemTime>, u64);

/// Watched files and their fingerprints at one point in time
pub type Snapshot = BTreeMap<PathBuf, Fingerprint>;

/// Periodically scans the projects root and reports git file changes
#[derive(Debug)]
pub struct PollWatcher {
    root: PathBuf,
    matcher: GlobSet,
    interval: Duration,
    max_depth: usize,
}

impl PollWatcher {
    pub fn new(root: impl Into<PathBuf>, config: &WatchConfig) -> Result<Self> {
        let glob = Glob::new(&config.pattern).map_err(|e| {
            Error::Config(format!("Invalid watch pattern '{}': {}", config.pattern, e))
        })?;
        let matcher = GlobSetBuilder::new()
            .add(glob)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build watch pattern: {}", e)))?;

        Ok(Self {
            root: root.into(),
            matcher,
            interval: config.poll_interval.max(Duration::from_millis(10)),
            max_depth: config.max_depth,
        })
    }

    /// Current state of every watched file
    pub fn scan(&self) -> Snapshot {
        let mut snapshot = Snapshot::new();

        let mut walker = WalkDir::new(&self.root)
            .max_depth(self.max_depth)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| e.file_type().is_dir() && e.file_name() != ".git");

        while let Some(entry) = walker.next() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    trace!("Cannot read directory: {}", e);
                    continue;
                }
            };

            let git_dir = entry.path().join(".git");
            if !git_dir.is_dir() {
                continue;
            }

            for name in GIT_FILES {
                self.record(&git_dir.join(name), &mut snapshot);
            }

            // Below the root, a repository's working tree is not searched for
            // more projects
            if entry.depth() > 0 {
                walker.skip_current_dir();
            }
        }

        snapshot
    }

    fn record(&self, file: &Path, snapshot: &mut Snapshot) {
        let Ok(relative) = file.strip_prefix(&self.root) else {
            return;
        };
        if !self.matcher.is_match(relative) {
            return;
        }

        if let Ok(meta) = fs::metadata(file) {
            snapshot.insert(file.to_path_buf(), (meta.modified().ok(), meta.len()));
        }
    }

    /// Events turning `previous` into `current`
    pub fn diff(previous: &Snapshot, current: &Snapshot) -> Vec<WatchEvent> {
        let mut events = Vec::new();

        for (path, fingerprint) in current {
            match previous.get(path) {
                None => events.push(WatchEvent::new(WatchEventKind::Create, path)),
                Some(old) if old != fingerprint => {
                    events.push(WatchEvent::new(WatchEventKind::Change, path))
                }
                Some(_) => {}
            }
        }

        for path in previous.keys() {
            if !current.contains_key(path) {
                events.push(WatchEvent::new(WatchEventKind::Delete, path));
            }
        }

        events
    }

    /// Take a baseline now and report later changes on `sender`
    ///
    /// The polling task ends when the receiver is dropped or the returned
    /// handle is disposed.
    pub fn start(self, sender: mpsc::Sender<WatchEvent>) -> WatchHandle {
        let baseline = self.scan();
        debug!(
            root = %self.root.display(),
            files = baseline.len(),
            "Watching git files"
        );

        let watcher = Arc::new(self);
        let task = tokio::spawn(async move {
            let mut previous = baseline;
            let mut ticker = tokio::time::interval(watcher.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let scanner = Arc::clone(&watcher);
                let current = match tokio::task::spawn_blocking(move || scanner.scan()).await {
                    Ok(snapshot) => snapshot,
                    Err(e) => {
                        debug!("Watch scan failed: {}", e);
                        continue;
                    }
                };

                for event in Self::diff(&previous, &current) {
                    if sender.send(event).await.is_err() {
                        debug!("Watch receiver closed, stopping poll");
                        return;
                    }
                }
                previous = current;
            }
        });

        WatchHandle::new(task)
    }
}
