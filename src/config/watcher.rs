//! Settings file watcher for hot reload.
//!
//! The parent directory is watched rather than the file itself, so
//! editors that replace the file on save and env-files created after
//! startup are both picked up.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::SettingsSource;
use crate::config::schema::LogSettings;

/// Monitors a settings file and publishes freshly loaded settings.
pub struct SettingsWatcher {
    path: PathBuf,
    source: SettingsSource,
    update_tx: mpsc::UnboundedSender<LogSettings>,
}

impl SettingsWatcher {
    /// Create a watcher for `path`, reloading through `source`.
    ///
    /// Returns the watcher and a receiver for settings updates.
    pub fn new(path: &Path, source: SettingsSource) -> (Self, mpsc::UnboundedReceiver<LogSettings>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                source,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching. Dropping the returned handle stops the watch.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let tx = self.update_tx.clone();
        let source = self.source.clone();
        let target = self.path.file_name().map(|name| name.to_os_string());
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let touches_target = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|name| name.to_os_string()) == target);
                    if !touches_target || !(event.kind.is_modify() || event.kind.is_create()) {
                        return;
                    }

                    tracing::info!("Settings file change detected, reloading...");
                    match source.load() {
                        Ok(settings) => {
                            let _ = tx.send(settings);
                        }
                        Err(e) => {
                            tracing::error!(error = %e, "Failed to reload settings, keeping current configuration");
                        }
                    }
                }
                Err(e) => tracing::error!(error = ?e, "Watch error"),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = %self.path.display(), "Settings watcher started");
        Ok(watcher)
    }
}
