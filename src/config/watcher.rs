//! Watches the config file and forwards `log.level` changes.
//!
//! Everything else in the file is fixed at registration; only the
//! threshold can move while the server runs.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::level::Severity;

pub struct ConfigWatcher {
    path: PathBuf,
    current: Arc<Mutex<Severity>>,
    level_tx: mpsc::UnboundedSender<Severity>,
}

impl ConfigWatcher {
    /// Returns the watcher and a receiver of new thresholds. `initial` is
    /// the level already in effect; reloads that keep it send nothing.
    pub fn new(path: &Path, initial: Severity) -> (Self, mpsc::UnboundedReceiver<Severity>) {
        let (level_tx, level_rx) = mpsc::unbounded_channel();

        let watcher = Self {
            path: path.to_path_buf(),
            current: Arc::new(Mutex::new(initial)),
            level_tx,
        };
        (watcher, level_rx)
    }

    /// Reload the file once; forwards the level if it changed.
    pub fn reload(&self) {
        Self::apply(&self.path, &self.current, &self.level_tx);
    }

    fn apply(path: &Path, current: &Mutex<Severity>, tx: &mpsc::UnboundedSender<Severity>) {
        let level = match load_config(path) {
            Ok(config) => config.log.level,
            Err(e) => {
                tracing::error!(error = %e, path = ?path, "Ignoring invalid config reload");
                return;
            }
        };

        let mut current = current.lock().unwrap_or_else(PoisonError::into_inner);
        if *current == level {
            tracing::debug!(%level, "Config reloaded, level unchanged");
            return;
        }

        *current = level;
        let _ = tx.send(level);
    }

    /// Start watching. Dropping the returned watcher stops it.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let Self {
            path,
            current,
            level_tx,
        } = self;
        let watched = path.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    Self::apply(&path, &current, &level_tx);
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = ?e, "Config watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&watched, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?watched, "Watching config for level changes");
        Ok(watcher)
    }
}
