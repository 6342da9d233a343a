// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing the setting model and group bookkeeping.
//!
//! This module contains the core types of the settings engine. It is
//! independent of files, directories and command lines, and defines the
//! fundamental concepts used throughout the library.

pub mod errors;
pub mod notifier;
pub mod registry;
pub mod service;
pub mod setting;
pub mod setting_kind;

// Re-export commonly used types
pub use errors::{Result, SettingsError};
pub use notifier::{ChangeListener, ChangeNotifier, ListenerId, SettingChange};
pub use registry::{GroupStatus, Registry, SettingsGroup};
pub use service::{GroupOutcome, SettingsStorage};
pub use setting::{Setting, SettingBuilder, SettingDescriptor, TrackingSuspension};
pub use setting_kind::{SettingKind, TypedValue};
