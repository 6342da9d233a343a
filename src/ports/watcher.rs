// SPDX-License-Identifier: MIT OR Apache-2.0

//! Group file watcher trait definition.
//!
//! This module defines the `GroupWatcher` trait, which provides an interface for
//! noticing that a group's persisted file was edited outside the program.

use crate::domain::Result;
use std::sync::Arc;

/// Type alias for reload callbacks.
///
/// This callback is invoked with the id of the group whose file changed.
pub type ReloadCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// A trait for watching persisted group files.
///
/// Watchers only report that a file changed; reloading it is up to the
/// callback, typically by calling `load_group` on the storage engine.
///
/// # Examples
///
/// ```rust
/// use propcfg::ports::{GroupWatcher, ReloadCallback};
/// use propcfg::domain::Result;
///
/// struct ManualWatcher {
///     callback: Option<ReloadCallback>,
/// }
///
/// impl GroupWatcher for ManualWatcher {
///     fn watch(&mut self, callback: ReloadCallback) -> Result<()> {
///         self.callback = Some(callback);
///         Ok(())
///     }
///
///     fn stop(&mut self) -> Result<()> {
///         self.callback = None;
///         Ok(())
///     }
/// }
/// ```
pub trait GroupWatcher: Send + Sync {
    /// Starts watching and invokes `callback` for every detected change.
    ///
    /// The callback should return quickly to avoid delaying the watcher.
    fn watch(&mut self, callback: ReloadCallback) -> Result<()>;

    /// Stops watching. Stopping a watcher that is not running is a no-op.
    fn stop(&mut self) -> Result<()>;
}
