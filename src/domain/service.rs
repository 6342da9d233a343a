// SPDX-License-Identifier: MIT OR Apache-2.0

//! Settings storage trait definition.
//!
//! This module defines the `SettingsStorage` trait, the main interface for
//! persisting groups of settings and restoring them again.

use crate::domain::{Result, Setting};
use std::sync::Arc;

/// The result of saving or loading one group.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupOutcome {
    /// The group's file was written.
    Saved,
    /// Nothing in the group changed, so the file was left alone.
    Skipped,
    /// Every expected key was found.
    Loaded,
    /// The file was read, but these non-internal keys were missing or held
    /// values the setting rejected, so those settings fell back to the default.
    LoadedIncomplete {
        /// The missing keys, in declaration order
        missing: Vec<String>,
    },
}

impl GroupOutcome {
    /// Returns `true` for every outcome except an incomplete load.
    pub fn is_complete(&self) -> bool {
        !matches!(self, GroupOutcome::LoadedIncomplete { .. })
    }
}

/// Persists and restores groups of settings.
///
/// Aggregate operations never fail as a whole: each group is handled on its
/// own and the returned flag is the logical AND of the group results. The
/// per-group operations return the finer-grained [`GroupOutcome`] and let
/// hard errors propagate.
///
/// # Examples
///
/// ```rust
/// use propcfg::domain::{GroupOutcome, Result, Setting, SettingsStorage};
/// use std::sync::Arc;
///
/// struct NullStorage;
///
/// impl SettingsStorage for NullStorage {
///     fn save(&self, _settings: &[Arc<Setting>]) -> bool {
///         true
///     }
///
///     fn load(&self, _settings: &[Arc<Setting>]) -> bool {
///         true
///     }
///
///     fn save_group(&self, _group_id: &str) -> Result<GroupOutcome> {
///         Ok(GroupOutcome::Skipped)
///     }
///
///     fn load_group(&self, _group_id: &str) -> Result<GroupOutcome> {
///         Ok(GroupOutcome::Loaded)
///     }
/// }
///
/// let storage = NullStorage;
/// assert!(storage.save(&[]));
/// ```
pub trait SettingsStorage {
    /// Saves the given settings, one file per owning group.
    ///
    /// Returns `true` only if every group was saved or skipped.
    fn save(&self, settings: &[Arc<Setting>]) -> bool;

    /// Loads the given settings, one file per owning group.
    ///
    /// Returns `false` if any group's file could not be read or parsed.
    /// Missing keys do not fail the load; they are recorded on the group.
    fn load(&self, settings: &[Arc<Setting>]) -> bool;

    /// Saves every setting registered with the group.
    fn save_group(&self, group_id: &str) -> Result<GroupOutcome>;

    /// Loads every setting registered with the group.
    fn load_group(&self, group_id: &str) -> Result<GroupOutcome>;
}
