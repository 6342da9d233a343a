// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the trait definitions (ports) for the collaborators the
//! storage engine depends on: parsing files, resolving configuration paths,
//! reading and writing files, and watching them. These traits are implemented
//! by adapters in the adapters layer.

pub mod backend;
pub mod parser;
pub mod path_resolver;
pub mod watcher;

// Re-export commonly used types
pub use backend::SettingsBackend;
pub use parser::SettingsParser;
pub use path_resolver::ConfigPathResolver;
pub use watcher::{GroupWatcher, ReloadCallback};
