// SPDX-License-Identifier: MIT OR Apache-2.0

//! Watcher implementations for noticing edits to persisted group files.
//!
//! This module contains implementations of the `GroupWatcher` trait.

#[cfg(feature = "reload")]
pub mod file_watcher;

#[cfg(feature = "reload")]
pub use file_watcher::GroupFileWatcher;
