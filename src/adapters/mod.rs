// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing the concrete collaborators of the storage engine.
//!
//! This module contains implementations of the traits defined in the ports
//! layer: the key-value file format, the file system backend, configuration
//! folder resolvers and file watchers. Command-line overrides live here too.

#[cfg(feature = "cli")]
pub mod cli;
pub mod config_dir;
pub mod properties_file;

pub mod watchers;

#[cfg(feature = "cli")]
pub use cli::CommandLineOverrides;
pub use config_dir::{DirectoryResolver, ProjectDirsResolver};
pub use properties_file::{FileBackend, PropertiesParser};
#[cfg(feature = "reload")]
pub use watchers::GroupFileWatcher;
