// SPDX-License-Identifier: MIT OR Apache-2.0

//! File system watcher for persisted group files.
//!
//! This module provides a watcher that monitors one group's settings file and
//! reports the group id when the file is modified outside the program.

use crate::domain::{Result, SettingsError};
use crate::ports::{GroupWatcher, ReloadCallback};
use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Watches the settings file of a single group.
///
/// Rapid successive modifications are debounced into one callback. The
/// engine's own saves also produce events; reloading a file that was just
/// saved leaves every value as it is.
///
/// # Examples
///
/// ```rust,no_run
/// use propcfg::adapters::GroupFileWatcher;
/// use propcfg::ports::GroupWatcher;
/// use std::sync::Arc;
///
/// # fn main() -> propcfg::domain::Result<()> {
/// let mut watcher = GroupFileWatcher::new("net.Client", "/path/to/Client.properties", None)?;
///
/// watcher.watch(Arc::new(|group: &str| {
///     println!("Settings file of {} changed", group);
/// }))?;
///
/// watcher.stop()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct GroupFileWatcher {
    group_id: String,
    file_path: PathBuf,
    debounce_delay: Duration,
    watcher: Option<RecommendedWatcher>,
    watch_thread: Option<JoinHandle<()>>,
    stop_tx: Option<Sender<()>>,
}

impl GroupFileWatcher {
    /// Creates a watcher for `group_id`'s file at `path`.
    ///
    /// The file must already exist; resolve it through the storage engine
    /// first. The debounce delay defaults to 500ms.
    pub fn new(
        group_id: impl Into<String>,
        path: impl AsRef<Path>,
        debounce_delay: Option<Duration>,
    ) -> Result<Self> {
        let file_path = path.as_ref().to_path_buf();
        if !file_path.is_file() {
            return Err(SettingsError::WatcherError {
                message: format!("File does not exist: {}", file_path.display()),
                source: None,
            });
        }

        Ok(Self {
            group_id: group_id.into(),
            file_path,
            debounce_delay: debounce_delay.unwrap_or(DEFAULT_DEBOUNCE),
            watcher: None,
            watch_thread: None,
            stop_tx: None,
        })
    }

    /// Returns the id of the watched group.
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Returns the watched file.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Returns `true` while the watcher thread is running.
    pub fn is_watching(&self) -> bool {
        self.watcher.is_some()
    }

    fn concerns_file(event: &Event, file_path: &Path) -> bool {
        // Saves replace the file by renaming, so compare names within the directory
        event
            .paths
            .iter()
            .any(|p| p == file_path || p.file_name() == file_path.file_name())
    }
}

impl GroupWatcher for GroupFileWatcher {
    fn watch(&mut self, callback: ReloadCallback) -> Result<()> {
        if self.watcher.is_some() {
            return Err(SettingsError::WatcherError {
                message: "Watcher is already running".to_string(),
                source: None,
            });
        }

        let (event_tx, event_rx) = channel::<notify::Result<Event>>();
        let (stop_tx, stop_rx) = channel::<()>();

        let mut watcher =
            RecommendedWatcher::new(event_tx, notify::Config::default()).map_err(|e| {
                SettingsError::WatcherError {
                    message: format!("Failed to create file watcher: {}", e),
                    source: Some(Box::new(e)),
                }
            })?;

        // Watch the parent directory, file watches do not survive a rename
        let watch_path = self
            .file_path
            .parent()
            .ok_or_else(|| SettingsError::WatcherError {
                message: "Failed to get parent directory".to_string(),
                source: None,
            })?
            .to_path_buf();

        watcher
            .watch(&watch_path, RecursiveMode::NonRecursive)
            .map_err(|e| SettingsError::WatcherError {
                message: format!("Failed to start watching: {}", e),
                source: Some(Box::new(e)),
            })?;

        let group_id = self.group_id.clone();
        let file_path = self.file_path.clone();
        let debounce_delay = self.debounce_delay;

        let watch_thread = thread::spawn(move || {
            let mut last_event_time: Option<Instant> = None;
            loop {
                if stop_rx.try_recv().is_ok() {
                    break;
                }
                match event_rx.recv_timeout(POLL_INTERVAL) {
                    Ok(Ok(event)) if event.kind.is_modify() || event.kind.is_create() => {
                        if !Self::concerns_file(&event, &file_path) {
                            continue;
                        }
                        let now = Instant::now();
                        let should_trigger = last_event_time
                            .map(|last| now.duration_since(last) >= debounce_delay)
                            .unwrap_or(true);
                        if should_trigger {
                            last_event_time = Some(now);
                            debug!("Settings file of group {} changed", group_id);
                            callback(&group_id);
                        }
                    }
                    Ok(Ok(_)) => {}
                    Ok(Err(e)) => warn!("File watcher error for group {}: {}", group_id, e),
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });

        self.watcher = Some(watcher);
        self.stop_tx = Some(stop_tx);
        self.watch_thread = Some(watch_thread);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        if let Some(handle) = self.watch_thread.take() {
            handle.join().map_err(|_| SettingsError::WatcherError {
                message: "Failed to join watcher thread".to_string(),
                source: None,
            })?;
        }

        self.watcher = None;
        Ok(())
    }
}

impl Drop for GroupFileWatcher {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}
