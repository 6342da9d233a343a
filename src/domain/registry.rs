// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-group metadata shared by every setting of a group.
//!
//! A group is the unit of persistence: one file per group. The [`Registry`]
//! tracks, per group id, the declared setting count, the aggregate changed
//! flag, the load state, and the settings registered with it. Groups are
//! created on first reference and never removed.

use crate::domain::errors::{Result, SettingsError};
use crate::domain::setting::{name_problem, Setting, SettingBuilder, SettingDescriptor};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

static GLOBAL: Lazy<Arc<Registry>> = Lazy::new(|| Arc::new(Registry::new()));

#[derive(Debug, Default)]
struct GroupRecord {
    setting_count: usize,
    changed: bool,
    loaded: bool,
    loaded_completely: bool,
    settings: Vec<Arc<Setting>>,
}

/// A consistent snapshot of one group's flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct GroupStatus {
    /// The declared number of settings, 0 if never declared
    pub setting_count: usize,
    /// Whether any non-internal setting of the group has changed
    pub changed: bool,
    /// Whether a load has been attempted
    pub loaded: bool,
    /// Whether the most recent load found every expected key
    pub loaded_completely: bool,
}

impl GroupStatus {
    /// Returns `true` if the group was loaded but not completely.
    pub fn has_load_problem(&self) -> bool {
        self.loaded && !self.loaded_completely
    }
}

/// Registry of settings groups.
///
/// All state sits behind one lock, so concurrent registration from several
/// threads is serialized and reads observe a consistent snapshot. Use
/// [`Registry::global`] for a process-wide instance, or construct a registry
/// explicitly and inject it (tests usually do).
///
/// # Examples
///
/// ```rust
/// use propcfg::domain::{Registry, Setting};
/// use std::sync::Arc;
///
/// let registry = Arc::new(Registry::new());
/// let timeout = Setting::integer(30)
///     .named("timeout")
///     .in_group("net.Client")
///     .register(&registry)
///     .unwrap();
///
/// assert!(!registry.is_changed("net.Client"));
/// timeout.set("60").unwrap();
/// assert!(registry.is_changed("net.Client"));
/// ```
#[derive(Debug, Default)]
pub struct Registry {
    groups: RwLock<HashMap<String, GroupRecord>>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            groups: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the process-wide registry.
    pub fn global() -> Arc<Registry> {
        Arc::clone(&GLOBAL)
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, GroupRecord>> {
        self.groups.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, GroupRecord>> {
        self.groups.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_group<R>(&self, group_id: &str, f: impl FnOnce(&mut GroupRecord) -> R) -> R {
        let mut groups = self.write();
        let record = groups.entry(group_id.to_string()).or_default();
        f(record)
    }

    /// Creates an empty group record if none exists yet.
    pub fn register(&self, group_id: &str) {
        self.with_group(group_id, |_| ());
    }

    /// Attaches a setting to its group.
    ///
    /// The setting must carry a name and a group id. A missing line number is
    /// assigned after the highest one already in the group. From now on a
    /// change of a non-internal setting also marks the group as changed.
    pub fn register_setting(self: &Arc<Self>, setting: Setting) -> Result<Arc<Setting>> {
        let group_id = setting
            .group_id()
            .ok_or_else(|| SettingsError::InvalidDefinition {
                message: format!("setting '{}' has no group", setting.name()),
            })?
            .to_string();
        if setting.name().is_empty() {
            return Err(SettingsError::InvalidDefinition {
                message: format!("unnamed setting in group '{}'", group_id),
            });
        }
        if let Some(problem) = name_problem(setting.name()) {
            return Err(SettingsError::InvalidDefinition {
                message: format!("setting '{}' in group '{}': {}", setting.name(), group_id, problem),
            });
        }

        let setting = Arc::new(setting);
        self.with_group(&group_id, |record| {
            if record.settings.iter().any(|s| s.name() == setting.name()) {
                return Err(SettingsError::InvalidDefinition {
                    message: format!(
                        "setting '{}' is already registered in group '{}'",
                        setting.name(),
                        group_id
                    ),
                });
            }
            if setting.line_number().is_none() {
                let next = record
                    .settings
                    .iter()
                    .filter_map(|s| s.line_number())
                    .max()
                    .map_or(1, |max| max + 1);
                setting.set_line_number(next);
            }
            if setting.is_changed() && !setting.is_internal() {
                record.changed = true;
            }
            record.settings.push(Arc::clone(&setting));
            Ok(())
        })?;

        setting.track_group(Arc::downgrade(self), group_id);
        Ok(setting)
    }

    /// Marks the group as changed.
    pub fn mark_changed(&self, group_id: &str) {
        self.with_group(group_id, |record| record.changed = true);
    }

    /// Returns `true` if any non-internal setting of the group has changed.
    pub fn is_changed(&self, group_id: &str) -> bool {
        self.read().get(group_id).is_some_and(|r| r.changed)
    }

    /// Declares the number of settings of a group.
    ///
    /// The count is write-once: if it is already set to a nonzero value the
    /// call returns `false` and the existing count stays.
    pub fn set_count(&self, group_id: &str, count: usize) -> bool {
        self.with_group(group_id, |record| {
            if record.setting_count != 0 {
                let error = SettingsError::write_once(
                    &format!("{}.setting_count", group_id),
                    record.setting_count,
                );
                tracing::warn!("Ignoring count {}: {}", count, error);
                false
            } else {
                record.setting_count = count;
                true
            }
        })
    }

    /// Returns the declared number of settings, if any.
    pub fn setting_count(&self, group_id: &str) -> Option<usize> {
        self.read()
            .get(group_id)
            .map(|r| r.setting_count)
            .filter(|count| *count != 0)
    }

    /// Records a complete load of the group.
    pub fn mark_loaded(&self, group_id: &str) {
        self.with_group(group_id, |record| {
            record.loaded = true;
            record.loaded_completely = true;
        });
    }

    /// Records a load that missed keys or failed.
    pub fn mark_load_problem(&self, group_id: &str) {
        self.with_group(group_id, |record| {
            record.loaded = true;
            record.loaded_completely = false;
        });
    }

    /// Returns `true` if a load has been attempted for the group.
    pub fn is_loaded(&self, group_id: &str) -> bool {
        self.read().get(group_id).is_some_and(|r| r.loaded)
    }

    /// Returns `true` only if the group was loaded and the load was incomplete.
    ///
    /// A group that was never loaded has no load problem.
    pub fn has_load_problem(&self, group_id: &str) -> bool {
        self.group_status(group_id)
            .is_some_and(|status| status.has_load_problem())
    }

    /// Returns a snapshot of the group's flags, or `None` for unknown groups.
    pub fn group_status(&self, group_id: &str) -> Option<GroupStatus> {
        self.read().get(group_id).map(|r| GroupStatus {
            setting_count: r.setting_count,
            changed: r.changed,
            loaded: r.loaded,
            loaded_completely: r.loaded_completely,
        })
    }

    /// Returns every known group id, sorted.
    pub fn all_group_ids(&self) -> BTreeSet<String> {
        self.read().keys().cloned().collect()
    }

    /// Returns the group's settings ordered by line number, then by
    /// registration order.
    pub fn settings_of(&self, group_id: &str) -> Vec<Arc<Setting>> {
        let mut settings = self
            .read()
            .get(group_id)
            .map(|r| r.settings.clone())
            .unwrap_or_default();
        settings.sort_by_key(|s| s.line_number().unwrap_or(u32::MAX));
        settings
    }

    /// Returns the captions of the group's settings, keyed by setting name.
    pub fn captions_of(&self, group_id: &str) -> HashMap<String, String> {
        self.settings_of(group_id)
            .iter()
            .filter_map(|s| s.caption().map(|c| (s.name().to_string(), c.to_string())))
            .collect()
    }

    /// Returns read-only descriptors of the group's settings, in order.
    pub fn describe_group(&self, group_id: &str) -> Vec<SettingDescriptor> {
        self.settings_of(group_id)
            .iter()
            .map(|s| s.descriptor())
            .collect()
    }

    /// Looks up a registered setting by name.
    pub fn find(&self, group_id: &str, name: &str) -> Option<Arc<Setting>> {
        self.read()
            .get(group_id)
            .and_then(|r| r.settings.iter().find(|s| s.name() == name).cloned())
    }
}

/// Returns the last segment of a group id, used as the file name stem.
///
/// # Examples
///
/// ```
/// use propcfg::domain::registry::group_simple_name;
///
/// assert_eq!(group_simple_name("com.example.NetworkSettings"), "NetworkSettings");
/// assert_eq!(group_simple_name("app::ui::Theme"), "Theme");
/// assert_eq!(group_simple_name("Plain"), "Plain");
/// ```
pub fn group_simple_name(group_id: &str) -> &str {
    group_id
        .rsplit(|c: char| matches!(c, '.' | ':' | '/' | '\\' | '$'))
        .find(|segment| !segment.is_empty())
        .unwrap_or(group_id)
}

/// Declares the settings of one group in order.
///
/// Each definition gets the group id, its name and, unless the builder set
/// one, the next line number. [`SettingsGroup::seal`] then writes the group's
/// setting count.
///
/// # Examples
///
/// ```rust
/// use propcfg::domain::{Registry, Setting, SettingsGroup};
/// use std::sync::Arc;
///
/// # fn main() -> propcfg::domain::Result<()> {
/// let registry = Arc::new(Registry::new());
/// let mut group = SettingsGroup::new("app.Window", &registry);
/// let width = group.define("width", Setting::integer(800).with_bounds(320.0, 7680.0))?;
/// let title = group.define("title", Setting::string("Untitled").with_caption("Appearance"))?;
/// assert!(group.seal());
///
/// assert_eq!(width.line_number(), Some(1));
/// assert_eq!(title.line_number(), Some(2));
/// assert_eq!(registry.setting_count("app.Window"), Some(2));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SettingsGroup {
    id: String,
    registry: Arc<Registry>,
    next_line: u32,
    settings: Vec<Arc<Setting>>,
}

impl SettingsGroup {
    /// Starts declaring the group `id` in `registry`.
    pub fn new(id: impl Into<String>, registry: &Arc<Registry>) -> Self {
        let id = id.into();
        registry.register(&id);
        Self {
            id,
            registry: Arc::clone(registry),
            next_line: 1,
            settings: Vec::new(),
        }
    }

    /// Returns the group id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the last segment of the group id.
    pub fn simple_name(&self) -> &str {
        group_simple_name(&self.id)
    }

    /// Returns the settings declared so far, in declaration order.
    pub fn settings(&self) -> &[Arc<Setting>] {
        &self.settings
    }

    /// Declares and registers the next setting of the group.
    pub fn define(
        &mut self,
        name: impl Into<String>,
        builder: SettingBuilder,
    ) -> Result<Arc<Setting>> {
        let line = builder.line_number().unwrap_or(self.next_line);
        let setting = builder
            .named(name)
            .in_group(self.id.clone())
            .at_line(line)
            .register(&self.registry)?;
        self.next_line = self.next_line.max(line + 1);
        self.settings.push(Arc::clone(&setting));
        Ok(setting)
    }

    /// Writes the number of declared settings to the registry once.
    pub fn seal(&self) -> bool {
        self.registry.set_count(&self.id, self.settings.len())
    }
}
