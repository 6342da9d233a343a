// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command-line overrides for registered settings.
//!
//! This module provides an adapter that reads setting values from
//! command-line arguments and applies them on top of whatever was loaded
//! from disk.

use crate::domain::registry::group_simple_name;
use crate::domain::Setting;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Setting values given on the command line.
///
/// Supported argument formats:
/// - `--key=value`: Long form with equals sign
/// - `--key value`: Long form with space-separated value
/// - `-k value`: Short form with space-separated value
///
/// In the space-separated forms a following argument that starts with `-` is
/// read as the next flag, unless it is a number such as `-5` or `-0.25`.
///
/// A key addresses a setting either by its bare name (`timeout`), by the
/// group's simple name and the setting name (`Client.timeout`), or by the
/// full group id and the setting name (`net.Client.timeout`). Qualified keys
/// win over bare ones.
///
/// Overrides are applied with `Setting::set`, so they count as user edits and
/// are persisted on the next save of the group.
///
/// # Examples
///
/// ```rust
/// use propcfg::adapters::CommandLineOverrides;
/// use propcfg::domain::{Registry, SettingsGroup, Setting};
/// use std::sync::Arc;
///
/// let registry = Arc::new(Registry::new());
/// let mut group = SettingsGroup::new("net.Client", &registry);
/// let timeout = group.define("timeout", Setting::integer(30)).unwrap();
///
/// let overrides = CommandLineOverrides::from_args(vec!["--Client.timeout=45"]);
/// let rejected = overrides.apply(group.settings());
/// assert!(rejected.is_empty());
/// assert_eq!(timeout.get_i64(0), Some(45));
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandLineOverrides {
    values: HashMap<String, String>,
}

impl CommandLineOverrides {
    /// Creates an empty set of overrides.
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    /// Parses overrides from a list of arguments.
    pub fn from_args<S: AsRef<str>>(args: Vec<S>) -> Self {
        let mut overrides = Self::new();
        overrides.parse_args(args);
        overrides
    }

    /// Parses overrides from the process's arguments, skipping the program name.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use propcfg::adapters::CommandLineOverrides;
    ///
    /// let overrides = CommandLineOverrides::from_env_args();
    /// ```
    pub fn from_env_args() -> Self {
        let args: Vec<String> = std::env::args().skip(1).collect();
        Self::from_args(args)
    }

    fn parse_args<S: AsRef<str>>(&mut self, args: Vec<S>) {
        let mut i = 0;
        while i < args.len() {
            let arg = args[i].as_ref();
            let key = if let Some(long) = arg.strip_prefix("--") {
                if let Some((key, value)) = long.split_once('=') {
                    self.values.insert(key.to_string(), value.to_string());
                    i += 1;
                    continue;
                }
                long
            } else if arg.len() == 2 && arg.starts_with('-') {
                &arg[1..]
            } else {
                i += 1;
                continue;
            };

            // The next argument is only a value if it is not another flag
            match args.get(i + 1).map(|next| next.as_ref()) {
                Some(next) if !next.starts_with('-') || is_number(next) => {
                    self.values.insert(key.to_string(), next.to_string());
                    i += 2;
                }
                _ => i += 1,
            }
        }
    }

    /// Returns the raw override for `key`, if one was given.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Returns the number of parsed overrides.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no overrides were parsed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    fn lookup(&self, setting: &Setting) -> Option<(&str, &str)> {
        let name = setting.name();
        if name.is_empty() {
            return None;
        }
        let mut candidates = Vec::with_capacity(3);
        if let Some(group_id) = setting.group_id() {
            candidates.push(format!("{}.{}", group_id, name));
            candidates.push(format!("{}.{}", group_simple_name(group_id), name));
        }
        candidates.push(name.to_string());

        candidates.into_iter().find_map(|key| {
            self.values
                .get_key_value(key.as_str())
                .map(|(k, v)| (k.as_str(), v.as_str()))
        })
    }

    /// Applies every matching override and returns the keys whose values the
    /// settings rejected.
    ///
    /// Rejected values leave their settings unchanged. Overrides that match no
    /// setting are ignored.
    pub fn apply(&self, settings: &[Arc<Setting>]) -> Vec<String> {
        let mut rejected = Vec::new();
        for setting in settings {
            let Some((key, value)) = self.lookup(setting) else {
                continue;
            };
            match setting.set(value) {
                Ok(()) => debug!("Applied command-line override {}={}", key, value),
                Err(e) => {
                    warn!("Ignoring command-line override {}: {}", key, e);
                    rejected.push(key.to_string());
                }
            }
        }
        rejected
    }
}

fn is_number(arg: &str) -> bool {
    arg.parse::<i64>().is_ok() || arg.parse::<f64>().map_or(false, f64::is_finite)
}
