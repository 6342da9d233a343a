// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration folder resolvers.
//!
//! `ProjectDirsResolver` follows the operating system's conventions for
//! per-user configuration folders; `DirectoryResolver` keeps every program's
//! files below one fixed root, which is handy for tests and portable installs.

use crate::domain::{Result, SettingsError};
use crate::ports::ConfigPathResolver;
use directories::ProjectDirs;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Creates `path`'s parent directories and an empty file if they are missing.
fn ensure_file(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if !path.exists() {
        debug!("Creating settings file {}", path.display());
    }
    OpenOptions::new().create(true).append(true).open(path)?;
    Ok(())
}

fn check_file_name(file_name: &str) -> Result<()> {
    let invalid = file_name.is_empty()
        || file_name.contains(['/', '\\'])
        || file_name == "."
        || file_name == "..";
    if invalid {
        return Err(SettingsError::PathResolution {
            message: format!("Invalid settings file name: '{}'", file_name),
            source: None,
        });
    }
    Ok(())
}

/// Resolves files in the platform's per-user configuration folder.
///
/// On Linux this is `$XDG_CONFIG_HOME/<program>` (usually
/// `~/.config/<program>`), on macOS
/// `~/Library/Application Support/<qualifier>.<organization>.<program>`, and
/// on Windows `%APPDATA%\<organization>\<program>\config`.
///
/// # Examples
///
/// ```rust,no_run
/// use propcfg::adapters::ProjectDirsResolver;
/// use propcfg::ports::ConfigPathResolver;
///
/// let resolver = ProjectDirsResolver::new("org", "example");
/// let path = resolver.resolve("myapp", "Client.properties").unwrap();
/// assert!(path.exists());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ProjectDirsResolver {
    qualifier: String,
    organization: String,
}

impl ProjectDirsResolver {
    /// Creates a resolver for the given reverse-domain qualifier and organization.
    pub fn new(qualifier: impl Into<String>, organization: impl Into<String>) -> Self {
        Self {
            qualifier: qualifier.into(),
            organization: organization.into(),
        }
    }

    /// Returns the configuration folder of `program_name` without creating it.
    pub fn config_dir(&self, program_name: &str) -> Result<PathBuf> {
        ProjectDirs::from(&self.qualifier, &self.organization, program_name)
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or_else(|| SettingsError::PathResolution {
                message: format!(
                    "No home directory available for program '{}'",
                    program_name
                ),
                source: None,
            })
    }
}

impl ConfigPathResolver for ProjectDirsResolver {
    fn resolve(&self, program_name: &str, file_name: &str) -> Result<PathBuf> {
        let path = self.locate(program_name, file_name)?;
        ensure_file(&path).map_err(|e| SettingsError::PathResolution {
            message: format!("Cannot create {}", path.display()),
            source: Some(Box::new(e)),
        })?;
        Ok(path)
    }

    fn locate(&self, program_name: &str, file_name: &str) -> Result<PathBuf> {
        check_file_name(file_name)?;
        Ok(self.config_dir(program_name)?.join(file_name))
    }
}

/// Resolves files below a fixed root, one sub-folder per program.
///
/// # Examples
///
/// ```rust
/// use propcfg::adapters::DirectoryResolver;
/// use propcfg::ports::ConfigPathResolver;
///
/// let root = std::env::temp_dir().join("propcfg-doc");
/// let resolver = DirectoryResolver::new(&root);
/// let path = resolver.resolve("myapp", "Client.properties").unwrap();
/// assert_eq!(path, root.join("myapp").join("Client.properties"));
/// ```
#[derive(Debug, Clone)]
pub struct DirectoryResolver {
    root: PathBuf,
}

impl DirectoryResolver {
    /// Creates a resolver rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Returns the root folder.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ConfigPathResolver for DirectoryResolver {
    fn resolve(&self, program_name: &str, file_name: &str) -> Result<PathBuf> {
        let path = self.locate(program_name, file_name)?;
        ensure_file(&path).map_err(|e| SettingsError::PathResolution {
            message: format!("Cannot create {}", path.display()),
            source: Some(Box::new(e)),
        })?;
        Ok(path)
    }

    fn locate(&self, program_name: &str, file_name: &str) -> Result<PathBuf> {
        check_file_name(file_name)?;
        let mut path = self.root.clone();
        if !program_name.is_empty() {
            path.push(program_name);
        }
        path.push(file_name);
        Ok(path)
    }
}
