// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronous change notification for settings.
//!
//! Each setting owns a [`ChangeNotifier`]. Listeners are plain callbacks that
//! are invoked on the mutating thread, after the setting's own lock has been
//! released, with the old and new raw values.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Describes one value change of a setting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingChange {
    /// The setting name, empty if it was never named
    pub name: String,
    /// The value index that changed
    pub index: usize,
    /// The previous raw value, `None` when the value was appended
    pub old: Option<String>,
    /// The new raw value, `None` when the value was truncated away
    pub new: Option<String>,
}

/// Type alias for change listeners.
///
/// This callback is invoked every time a setting value changes.
pub type ChangeListener = Arc<dyn Fn(&SettingChange) + Send + Sync>;

/// Identifies a subscribed listener so it can be removed again.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// An observer list of [`ChangeListener`]s.
///
/// # Examples
///
/// ```rust
/// use propcfg::domain::{ChangeNotifier, SettingChange};
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// let notifier = ChangeNotifier::new();
/// let calls = Arc::new(AtomicUsize::new(0));
/// let counter = Arc::clone(&calls);
/// let id = notifier.subscribe(Arc::new(move |_change: &SettingChange| {
///     counter.fetch_add(1, Ordering::SeqCst);
/// }));
///
/// notifier.notify(&SettingChange {
///     name: "timeout".to_string(),
///     index: 0,
///     old: Some("30".to_string()),
///     new: Some("60".to_string()),
/// });
/// assert_eq!(calls.load(Ordering::SeqCst), 1);
/// assert!(notifier.unsubscribe(id));
/// ```
pub struct ChangeNotifier {
    next_id: AtomicU64,
    listeners: RwLock<Vec<(ListenerId, ChangeListener)>>,
}

impl ChangeNotifier {
    /// Creates a notifier with no listeners.
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Adds a listener and returns the id to remove it with.
    pub fn subscribe(&self, listener: ChangeListener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, listener));
        id
    }

    /// Removes a listener. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self
            .listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }

    /// Returns the number of subscribed listeners.
    pub fn len(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no listener is subscribed.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Invokes every listener in subscription order.
    ///
    /// The listener list is snapshotted first, so listeners may subscribe or
    /// unsubscribe from within the callback.
    pub fn notify(&self, change: &SettingChange) {
        let snapshot: Vec<ChangeListener> = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(change);
        }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("listeners", &self.len())
            .finish()
    }
}
