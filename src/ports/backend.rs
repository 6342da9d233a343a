// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage backend trait definition.
//!
//! The storage engine never touches the file system directly; it reads and
//! writes whole group files through a `SettingsBackend`.

use crate::domain::Result;
use std::path::Path;
use std::sync::Arc;

/// Reads and writes whole settings files.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the storage engine may be shared
/// between threads.
///
/// # Examples
///
/// ```rust
/// use propcfg::ports::SettingsBackend;
/// use propcfg::domain::Result;
/// use std::collections::HashMap;
/// use std::path::{Path, PathBuf};
/// use std::sync::Mutex;
///
/// #[derive(Default)]
/// struct MemoryBackend {
///     files: Mutex<HashMap<PathBuf, String>>,
/// }
///
/// impl SettingsBackend for MemoryBackend {
///     fn read(&self, path: &Path) -> Result<String> {
///         Ok(self.files.lock().unwrap().get(path).cloned().unwrap_or_default())
///     }
///
///     fn write(&self, path: &Path, lines: &[String]) -> Result<()> {
///         self.files.lock().unwrap().insert(path.to_path_buf(), lines.concat());
///         Ok(())
///     }
/// }
/// ```
pub trait SettingsBackend: Send + Sync {
    /// Reads the whole file.
    fn read(&self, path: &Path) -> Result<String>;

    /// Replaces the file's content with `lines`, each already newline-terminated.
    ///
    /// The write must be flushed before returning.
    fn write(&self, path: &Path, lines: &[String]) -> Result<()>;
}

/// A shared backend, so callers can keep a handle to inspect it.
impl<T: SettingsBackend + ?Sized> SettingsBackend for Arc<T> {
    fn read(&self, path: &Path) -> Result<String> {
        (**self).read(path)
    }

    fn write(&self, path: &Path, lines: &[String]) -> Result<()> {
        (**self).write(path, lines)
    }
}
