// SPDX-License-Identifier: MIT OR Apache-2.0

//! A typed settings engine with file-per-group persistence.
//!
//! Applications declare their settings in groups. Each setting has a fixed
//! kind taken from its default value (or chosen explicitly), optional numeric
//! bounds, descriptive metadata, and a change flag. The storage engine writes
//! each group to a human-editable key-value file in the program's
//! configuration folder and restores it on the next start.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Settings, kinds, change notification, the group
//!   registry, errors, and the `SettingsStorage` trait
//! - **Ports**: Trait definitions for the engine's collaborators
//!   (`SettingsParser`, `SettingsBackend`, `ConfigPathResolver`, `GroupWatcher`)
//! - **Adapters**: The key-value file format, the file system backend,
//!   configuration folder resolvers, command-line overrides, file watching
//! - **Service**: The ordered writer and the storage engine
//!
//! # Feature Flags
//!
//! - `cli`: Enable command-line overrides (default)
//! - `reload`: Enable watching group files with `notify`
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use propcfg::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let registry = Registry::global();
//! let mut group = SettingsGroup::new("myapp.Network", &registry);
//! let timeout = group.define(
//!     "timeout",
//!     Setting::integer(30)
//!         .with_bounds(1.0, 600.0)
//!         .with_description("Socket timeout in seconds"),
//! )?;
//! group.seal();
//!
//! let engine = StorageEngine::builder().with_program_name("myapp").build()?;
//! // The first start has no file yet and keeps the defaults
//! let _ = engine.load_group("myapp.Network");
//!
//! timeout.set("45")?;
//! engine.save_all();
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::domain::{
        GroupOutcome, Registry, Result, Setting, SettingKind, SettingsError, SettingsGroup,
        SettingsStorage, TypedValue,
    };
    pub use crate::ports::{ConfigPathResolver, SettingsBackend, SettingsParser};
    pub use crate::service::{StorageEngine, StorageEngineBuilder};

    #[cfg(feature = "cli")]
    pub use crate::adapters::CommandLineOverrides;
    #[cfg(feature = "reload")]
    pub use crate::adapters::GroupFileWatcher;
}
