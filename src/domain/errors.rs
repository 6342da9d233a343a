// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the settings engine.
//!
//! This module defines the error types that can occur when defining, mutating,
//! loading or saving settings. All errors use `thiserror` for proper error
//! handling and conversion.

use crate::domain::setting_kind::SettingKind;
use std::path::PathBuf;
use thiserror::Error;

/// The main error type for settings operations.
///
/// Most of these errors are local and recoverable: a failed `set` leaves the
/// setting untouched, a failed group load leaves every in-memory value as it
/// was. The enum is marked `#[non_exhaustive]` to allow for future additions.
///
/// # Examples
///
/// ```
/// use propcfg::domain::errors::SettingsError;
/// use propcfg::domain::SettingKind;
///
/// fn set_port() -> Result<(), SettingsError> {
///     Err(SettingsError::TypeMismatch {
///         name: "port".to_string(),
///         kind: SettingKind::Integer,
///         value: "eighty".to_string(),
///     })
/// }
///
/// assert!(set_port().is_err());
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SettingsError {
    /// A value could not be coerced to the setting's fixed kind.
    #[error("Value '{value}' for setting '{name}' is not a valid {kind}")]
    TypeMismatch {
        /// The setting name
        name: String,
        /// The kind the setting was fixed to at construction
        kind: SettingKind,
        /// The rejected raw value
        value: String,
    },

    /// A value index was outside the setting's current list of values.
    #[error("Index {index} is out of range for setting '{name}' with {len} value(s)")]
    IndexOutOfRange {
        /// The setting name
        name: String,
        /// The requested index
        index: usize,
        /// The number of values currently stored
        len: usize,
    },

    /// A persisted file did not contain a key the group expects.
    #[error("Key '{key}' is missing from the persisted file of group '{group}'")]
    MissingKey {
        /// The group identifier
        group: String,
        /// The missing key
        key: String,
    },

    /// A write-once field was already set.
    #[error("Field '{field}' is already set to '{current}'")]
    WriteOnceViolation {
        /// The field name
        field: String,
        /// The value that stays in place
        current: String,
    },

    /// A setting definition was rejected by its builder.
    #[error("Invalid setting definition: {message}")]
    InvalidDefinition {
        /// The error message
        message: String,
    },

    /// A persisted file could not be parsed.
    #[error("Failed to parse settings file{}: line {line}: {message}", path_suffix(.path))]
    ParseError {
        /// The file being parsed, if known
        path: Option<PathBuf>,
        /// The 1-based line number
        line: usize,
        /// The error message
        message: String,
    },

    /// The configuration path for a group could not be resolved.
    #[error("Failed to resolve configuration path: {message}")]
    PathResolution {
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A persisted file exceeded the read size limit.
    #[error("Settings file too large: {size} bytes (max {max} bytes)")]
    FileTooLarge {
        /// The actual size in bytes
        size: u64,
        /// The allowed maximum in bytes
        max: u64,
    },

    /// A file watcher could not be started or stopped.
    #[error("Settings watcher error: {message}")]
    WatcherError {
        /// The error message
        message: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An I/O error occurred while reading or writing a settings file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    match path {
        Some(p) => format!(" '{}'", p.display()),
        None => String::new(),
    }
}

impl SettingsError {
    /// Creates a `TypeMismatch` error for the given setting.
    pub fn type_mismatch(name: &str, kind: SettingKind, value: &str) -> Self {
        SettingsError::TypeMismatch {
            name: name.to_string(),
            kind,
            value: value.to_string(),
        }
    }

    /// Creates an `IndexOutOfRange` error for the given setting.
    pub fn index_out_of_range(name: &str, index: usize, len: usize) -> Self {
        SettingsError::IndexOutOfRange {
            name: name.to_string(),
            index,
            len,
        }
    }

    /// Creates a `WriteOnceViolation` error for the given field.
    pub fn write_once(field: &str, current: impl ToString) -> Self {
        SettingsError::WriteOnceViolation {
            field: field.to_string(),
            current: current.to_string(),
        }
    }

    /// Returns `true` for errors that leave the setting or group untouched and
    /// can simply be reported back to the user.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SettingsError::TypeMismatch { .. }
                | SettingsError::IndexOutOfRange { .. }
                | SettingsError::MissingKey { .. }
                | SettingsError::WriteOnceViolation { .. }
        )
    }
}

/// A specialized Result type for settings operations.
pub type Result<T> = std::result::Result<T, SettingsError>;
