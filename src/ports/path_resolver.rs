// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration path resolution trait definition.

use crate::domain::Result;
use std::path::PathBuf;

/// Resolves where a program keeps a settings file.
///
/// [`resolve`](ConfigPathResolver::resolve) is used before writing and must
/// make sure the returned file and its parent directories exist, creating them
/// if needed. [`locate`](ConfigPathResolver::locate) is used before reading
/// and must not create anything, so a missing file stays missing.
///
/// # Examples
///
/// ```rust
/// use propcfg::ports::ConfigPathResolver;
/// use propcfg::domain::Result;
/// use std::path::PathBuf;
///
/// struct TempResolver;
///
/// impl ConfigPathResolver for TempResolver {
///     fn resolve(&self, program_name: &str, file_name: &str) -> Result<PathBuf> {
///         Ok(std::env::temp_dir().join(program_name).join(file_name))
///     }
/// }
/// ```
pub trait ConfigPathResolver: Send + Sync {
    /// Returns the path of `file_name` in `program_name`'s configuration folder.
    fn resolve(&self, program_name: &str, file_name: &str) -> Result<PathBuf>;

    /// Returns the same path as [`resolve`](ConfigPathResolver::resolve)
    /// without creating the file or its folders.
    ///
    /// The default implementation calls `resolve`, which suits resolvers
    /// that never touch the file system.
    fn locate(&self, program_name: &str, file_name: &str) -> Result<PathBuf> {
        self.resolve(program_name, file_name)
    }
}
