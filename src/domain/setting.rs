// SPDX-License-Identifier: MIT OR Apache-2.0

//! The typed, boundable, change-tracked setting.
//!
//! A [`Setting`] holds an ordered list of raw string values (index 0 is the
//! simple value) together with their coerced [`TypedValue`]s. Its kind is
//! fixed at construction; every later mutation must coerce to that kind or it
//! is rejected without touching the stored values.

use crate::domain::errors::{Result, SettingsError};
use crate::domain::notifier::{ChangeListener, ChangeNotifier, ListenerId, SettingChange};
use crate::domain::registry::Registry;
use crate::domain::setting_kind::{SettingKind, TypedValue};
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

#[derive(Debug)]
struct SettingState {
    values: Vec<String>,
    typed: Vec<TypedValue>,
    minimum: Option<f64>,
    maximum: Option<f64>,
}

/// The listener that flips the `changed` flags, plus its subscription id while
/// it is attached.
struct Tracker {
    listener: ChangeListener,
    id: Option<ListenerId>,
}

/// A single named, typed configuration value.
///
/// Settings are shared as `Arc<Setting>` and use interior mutability, so the
/// storage engine, a UI and background code can all hold the same instance.
///
/// # Examples
///
/// ```
/// use propcfg::domain::{Setting, SettingKind};
///
/// let retries = Setting::new("3", false);
/// assert_eq!(retries.kind(), SettingKind::Integer);
///
/// retries.set("5").unwrap();
/// assert_eq!(retries.get_i64(0), Some(5));
/// assert!(retries.is_changed());
///
/// assert!(retries.set("many").is_err());
/// assert_eq!(retries.value(), "5");
/// ```
pub struct Setting {
    default_value: String,
    kind: SettingKind,
    variants: Vec<String>,
    internal: bool,
    state: RwLock<SettingState>,
    changed: Arc<AtomicBool>,
    group_id: OnceCell<String>,
    line_number: OnceCell<u32>,
    name: OnceCell<String>,
    description: OnceCell<String>,
    caption: OnceCell<String>,
    notifier: ChangeNotifier,
    tracker: Mutex<Tracker>,
}

impl Setting {
    /// Creates a setting whose kind is inferred from its default value.
    ///
    /// Inference tries Boolean (`true`/`false`), then Integer, then Double and
    /// falls back to String.
    ///
    /// The first value is seeded with the canonical rendering of the default,
    /// so `"007"` reads back as `7` and `"1.50"` as `1.5`, while
    /// [`default_value`](Setting::default_value) keeps the text as given. This
    /// keeps a later `set` of the same number from counting as a change.
    pub fn new(default_value: impl Into<String>, internal: bool) -> Self {
        let default_value = default_value.into();
        let typed = TypedValue::infer(&default_value);
        Self::from_parts(default_value, typed, Vec::new(), internal)
    }

    fn from_parts(
        default_value: String,
        typed: TypedValue,
        variants: Vec<String>,
        internal: bool,
    ) -> Self {
        let changed = Arc::new(AtomicBool::new(false));
        let notifier = ChangeNotifier::new();
        let listener = tracker_listener(Arc::clone(&changed), None);
        let id = notifier.subscribe(Arc::clone(&listener));

        Self {
            default_value,
            kind: typed.kind(),
            variants,
            internal,
            state: RwLock::new(SettingState {
                values: vec![typed.to_string()],
                typed: vec![typed],
                minimum: None,
                maximum: None,
            }),
            changed,
            group_id: OnceCell::new(),
            line_number: OnceCell::new(),
            name: OnceCell::new(),
            description: OnceCell::new(),
            caption: OnceCell::new(),
            notifier,
            tracker: Mutex::new(Tracker {
                listener,
                id: Some(id),
            }),
        }
    }

    /// Starts a builder for a setting whose kind is inferred from `default`.
    pub fn inferred(default: impl Into<String>) -> SettingBuilder {
        let default = default.into();
        let typed = TypedValue::infer(&default);
        SettingBuilder::new(default, typed.kind())
    }

    /// Starts a builder for a String setting.
    pub fn string(default: impl Into<String>) -> SettingBuilder {
        SettingBuilder::new(default.into(), SettingKind::String)
    }

    /// Starts a builder for an Integer setting.
    pub fn integer(default: i64) -> SettingBuilder {
        SettingBuilder::new(default.to_string(), SettingKind::Integer)
    }

    /// Starts a builder for a Double setting.
    pub fn double(default: f64) -> SettingBuilder {
        SettingBuilder::new(default.to_string(), SettingKind::Double)
    }

    /// Starts a builder for a Boolean setting.
    pub fn boolean(default: bool) -> SettingBuilder {
        SettingBuilder::new(default.to_string(), SettingKind::Boolean)
    }

    /// Starts a builder for an Enum setting restricted to `variants`.
    ///
    /// # Examples
    ///
    /// ```
    /// use propcfg::domain::Setting;
    ///
    /// let level = Setting::enumeration("Info", ["Debug", "Info", "Warn"])
    ///     .named("log_level")
    ///     .build()
    ///     .unwrap();
    /// level.set("warn").unwrap();
    /// assert_eq!(level.value(), "Warn");
    /// ```
    pub fn enumeration<I, S>(default: impl Into<String>, variants: I) -> SettingBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = SettingBuilder::new(default.into(), SettingKind::Enum);
        builder.variants = variants.into_iter().map(Into::into).collect();
        builder
    }

    fn read_state(&self) -> RwLockReadGuard<'_, SettingState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, SettingState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the default value the setting was constructed with.
    pub fn default_value(&self) -> &str {
        &self.default_value
    }

    /// Returns the kind fixed at construction.
    pub fn kind(&self) -> SettingKind {
        self.kind
    }

    /// Returns the allowed variant names of an Enum setting.
    pub fn variants(&self) -> &[String] {
        &self.variants
    }

    /// Returns `true` if the setting is excluded from persistence.
    pub fn is_internal(&self) -> bool {
        self.internal
    }

    /// Returns `true` once any value has changed after construction.
    pub fn is_changed(&self) -> bool {
        self.changed.load(Ordering::SeqCst)
    }

    /// Returns the number of stored values.
    pub fn len(&self) -> usize {
        self.read_state().values.len()
    }

    /// Always `false`: a setting holds at least one value.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the simple value (index 0).
    pub fn value(&self) -> String {
        self.read_state().values[0].clone()
    }

    /// Returns a copy of all stored values.
    pub fn values(&self) -> Vec<String> {
        self.read_state().values.clone()
    }

    /// Returns the raw value at `index`.
    pub fn get(&self, index: usize) -> Result<String> {
        let state = self.read_state();
        state
            .values
            .get(index)
            .cloned()
            .ok_or_else(|| SettingsError::index_out_of_range(self.name(), index, state.values.len()))
    }

    /// Returns the typed value at `index`.
    pub fn get_typed(&self, index: usize) -> Result<TypedValue> {
        let state = self.read_state();
        state
            .typed
            .get(index)
            .cloned()
            .ok_or_else(|| SettingsError::index_out_of_range(self.name(), index, state.typed.len()))
    }

    /// Returns the value at `index` of a String setting.
    pub fn get_string(&self, index: usize) -> Option<String> {
        match self.get_typed(index).ok()? {
            TypedValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value at `index` of an Integer setting.
    pub fn get_i64(&self, index: usize) -> Option<i64> {
        match self.get_typed(index).ok()? {
            TypedValue::Integer(i) => Some(i),
            _ => None,
        }
    }

    /// Returns the value at `index` of a Double setting, or an Integer
    /// setting's value widened to `f64`.
    pub fn get_f64(&self, index: usize) -> Option<f64> {
        self.get_typed(index).ok()?.as_f64()
    }

    /// Returns the value at `index` of a Boolean setting.
    pub fn get_bool(&self, index: usize) -> Option<bool> {
        match self.get_typed(index).ok()? {
            TypedValue::Boolean(b) => Some(b),
            _ => None,
        }
    }

    /// Returns the variant name at `index` of an Enum setting.
    pub fn get_enum(&self, index: usize) -> Option<String> {
        match self.get_typed(index).ok()? {
            TypedValue::Enum(v) => Some(v),
            _ => None,
        }
    }

    fn coerce(&self, raw: &str, state: &SettingState) -> Result<TypedValue> {
        self.kind
            .coerce(raw, &self.variants)
            .map(|typed| typed.clamp(state.minimum, state.maximum))
            .ok_or_else(|| SettingsError::type_mismatch(self.name(), self.kind, raw))
    }

    /// Sets the simple value (index 0).
    pub fn set(&self, value: &str) -> Result<()> {
        self.set_at(0, value)
    }

    /// Sets the value at `index`, which must already exist.
    ///
    /// The value is coerced to the setting's kind and clamped to its bounds.
    /// Listeners are notified only if the stored value actually changes.
    pub fn set_at(&self, index: usize, value: &str) -> Result<()> {
        let change = {
            let mut state = self.write_state();
            if index >= state.values.len() {
                return Err(SettingsError::index_out_of_range(
                    self.name(),
                    index,
                    state.values.len(),
                ));
            }
            let typed = self.coerce(value, &state)?;
            let rendered = typed.to_string();
            if state.values[index] == rendered {
                None
            } else {
                let old = std::mem::replace(&mut state.values[index], rendered.clone());
                state.typed[index] = typed;
                Some(SettingChange {
                    name: self.name().to_string(),
                    index,
                    old: Some(old),
                    new: Some(rendered),
                })
            }
        };

        if let Some(change) = change {
            self.notifier.notify(&change);
        }
        Ok(())
    }

    /// Appends a value, growing the list by one.
    ///
    /// Returns `false` without mutating anything if the value cannot be
    /// coerced to the setting's kind.
    pub fn append(&self, value: &str) -> bool {
        let change = {
            let mut state = self.write_state();
            let typed = match self.coerce(value, &state) {
                Ok(typed) => typed,
                Err(e) => {
                    tracing::warn!("Rejected append to setting '{}': {}", self.name(), e);
                    return false;
                }
            };
            let rendered = typed.to_string();
            state.values.push(rendered.clone());
            state.typed.push(typed);
            SettingChange {
                name: self.name().to_string(),
                index: state.values.len() - 1,
                old: None,
                new: Some(rendered),
            }
        };

        self.notifier.notify(&change);
        true
    }

    /// Drops values beyond `len`. A setting always keeps at least one value.
    pub fn truncate(&self, len: usize) {
        let removed: Vec<SettingChange> = {
            let mut state = self.write_state();
            let keep = len.max(1);
            if keep >= state.values.len() {
                return;
            }
            state.typed.truncate(keep);
            state
                .values
                .drain(keep..)
                .enumerate()
                .map(|(offset, old)| SettingChange {
                    name: self.name().to_string(),
                    index: keep + offset,
                    old: Some(old),
                    new: None,
                })
                .collect()
        };

        for change in &removed {
            self.notifier.notify(change);
        }
    }

    /// Restores the simple value to the default value.
    pub fn reset_to_default(&self) -> Result<()> {
        self.set(&self.default_value)
    }

    /// Returns the inclusive lower bound, if any.
    pub fn minimum(&self) -> Option<f64> {
        self.read_state().minimum
    }

    /// Returns the inclusive upper bound, if any.
    pub fn maximum(&self) -> Option<f64> {
        self.read_state().maximum
    }

    /// Sets the inclusive lower bound for future `set`/`append` calls.
    ///
    /// Returns `false` for non-numeric settings or a non-finite bound. Values
    /// already stored are not clamped.
    pub fn set_minimum(&self, minimum: f64) -> bool {
        if !self.accepts_bound("minimum", minimum) {
            return false;
        }
        self.write_state().minimum = Some(minimum);
        true
    }

    /// Sets the inclusive upper bound for future `set`/`append` calls.
    ///
    /// Returns `false` for non-numeric settings or a non-finite bound. Values
    /// already stored are not clamped.
    pub fn set_maximum(&self, maximum: f64) -> bool {
        if !self.accepts_bound("maximum", maximum) {
            return false;
        }
        self.write_state().maximum = Some(maximum);
        true
    }

    fn accepts_bound(&self, which: &str, bound: f64) -> bool {
        if !self.kind.is_numeric() {
            tracing::warn!(
                "Ignoring {} for {} setting '{}'",
                which,
                self.kind,
                self.name()
            );
            return false;
        }
        if !bound.is_finite() {
            tracing::warn!("Ignoring non-finite {} for setting '{}'", which, self.name());
            return false;
        }
        true
    }

    /// Returns the setting name, or an empty string if it has none yet.
    pub fn name(&self) -> &str {
        self.name.get().map(String::as_str).unwrap_or("")
    }

    /// Sets the name once. Later calls return `false` and keep the first name.
    ///
    /// Names that cannot be read back as a file key are refused.
    pub fn set_name(&self, name: impl Into<String>) -> bool {
        let name = name.into();
        if let Some(problem) = name_problem(&name) {
            tracing::warn!("Ignoring setting name '{}': {}", name, problem);
            return false;
        }
        set_once(&self.name, "name", name)
    }

    /// Returns the owning group id, if assigned.
    pub fn group_id(&self) -> Option<&str> {
        self.group_id.get().map(String::as_str)
    }

    /// Sets the owning group id once.
    pub fn set_group_id(&self, group_id: impl Into<String>) -> bool {
        set_once(&self.group_id, "group_id", group_id.into())
    }

    /// Returns the declaration position used for ordering, if assigned.
    pub fn line_number(&self) -> Option<u32> {
        self.line_number.get().copied()
    }

    /// Sets the declaration position once.
    pub fn set_line_number(&self, line_number: u32) -> bool {
        set_once(&self.line_number, "line_number", line_number)
    }

    /// Returns the human-readable description, empty if none was given.
    pub fn description(&self) -> &str {
        self.description.get().map(String::as_str).unwrap_or("")
    }

    /// Sets the description once.
    pub fn set_description(&self, description: impl Into<String>) -> bool {
        set_once(&self.description, "description", description.into())
    }

    /// Returns the caption written above this setting, if any.
    pub fn caption(&self) -> Option<&str> {
        self.caption.get().map(String::as_str)
    }

    /// Sets the caption once.
    pub fn set_caption(&self, caption: impl Into<String>) -> bool {
        set_once(&self.caption, "caption", caption.into())
    }

    /// Subscribes a listener that is called after every value change.
    pub fn add_listener(&self, listener: ChangeListener) -> ListenerId {
        self.notifier.subscribe(listener)
    }

    /// Removes a listener added with [`Setting::add_listener`].
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        self.notifier.unsubscribe(id)
    }

    fn lock_tracker(&self) -> std::sync::MutexGuard<'_, Tracker> {
        self.tracker.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns `true` while changes mark the setting (and its group) as changed.
    pub fn is_tracking(&self) -> bool {
        self.lock_tracker().id.is_some()
    }

    /// Detaches the change tracker until the returned guard is dropped.
    ///
    /// Values set while the guard is alive do not flip the `changed` flags.
    /// Other listeners are still notified. Nested suspensions are allowed;
    /// only the outermost guard re-attaches the tracker.
    pub fn suspend_tracking(&self) -> TrackingSuspension<'_> {
        let mut tracker = self.lock_tracker();
        let was_attached = match tracker.id.take() {
            Some(id) => {
                self.notifier.unsubscribe(id);
                true
            }
            None => false,
        };
        TrackingSuspension {
            setting: self,
            was_attached,
        }
    }

    fn attach_tracker(&self) {
        let mut tracker = self.lock_tracker();
        if tracker.id.is_none() {
            let listener = Arc::clone(&tracker.listener);
            tracker.id = Some(self.notifier.subscribe(listener));
        }
    }

    /// Replaces the tracker with one that also marks `group_id` as changed.
    pub(crate) fn track_group(&self, registry: Weak<Registry>, group_id: String) {
        let group = if self.internal {
            None
        } else {
            Some((registry, group_id))
        };
        let listener = tracker_listener(Arc::clone(&self.changed), group);

        let mut tracker = self.lock_tracker();
        let reattach = match tracker.id.take() {
            Some(id) => {
                self.notifier.unsubscribe(id);
                true
            }
            None => false,
        };
        tracker.listener = listener;
        if reattach {
            let listener = Arc::clone(&tracker.listener);
            tracker.id = Some(self.notifier.subscribe(listener));
        }
    }

    /// Returns a read-only snapshot for presentation layers.
    pub fn descriptor(&self) -> SettingDescriptor {
        let state = self.read_state();
        SettingDescriptor {
            name: self.name().to_string(),
            group_id: self.group_id().map(str::to_string),
            line_number: self.line_number(),
            kind: self.kind,
            value: state.values[0].clone(),
            values: state.values.clone(),
            default_value: self.default_value.clone(),
            minimum: state.minimum,
            maximum: state.maximum,
            description: self.description().to_string(),
            caption: self.caption().map(str::to_string),
            variants: self.variants.clone(),
            internal: self.internal,
            changed: self.is_changed(),
        }
    }
}

impl fmt::Debug for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Setting")
            .field("name", &self.name())
            .field("group_id", &self.group_id())
            .field("kind", &self.kind)
            .field("values", &self.read_state().values)
            .field("default_value", &self.default_value)
            .field("internal", &self.internal)
            .field("changed", &self.is_changed())
            .finish()
    }
}

fn tracker_listener(
    changed: Arc<AtomicBool>,
    group: Option<(Weak<Registry>, String)>,
) -> ChangeListener {
    Arc::new(move |_change: &SettingChange| {
        changed.store(true, Ordering::SeqCst);
        if let Some((registry, group_id)) = &group {
            if let Some(registry) = registry.upgrade() {
                registry.mark_changed(group_id);
            }
        }
    })
}

/// Explains why `name` cannot be used as a key in a settings file.
pub(crate) fn name_problem(name: &str) -> Option<&'static str> {
    if name.is_empty() {
        Some("name is empty")
    } else if name.trim() != name {
        Some("name has leading or trailing whitespace")
    } else if name.starts_with(['#', '!']) {
        Some("name starts with a comment marker")
    } else if name.contains(['=', '[', ']', '\n', '\r']) {
        Some("name contains '=', a bracket or a line break")
    } else {
        None
    }
}

fn set_once<T>(cell: &OnceCell<T>, field: &str, value: T) -> bool
where
    T: fmt::Display + PartialEq,
{
    match cell.set(value) {
        Ok(()) => true,
        Err(rejected) => {
            if let Some(current) = cell.get() {
                if *current == rejected {
                    tracing::debug!("Field '{}' already set to '{}'", field, current);
                } else {
                    let error = SettingsError::write_once(field, current);
                    tracing::warn!("Ignoring '{}': {}", rejected, error);
                }
            }
            false
        }
    }
}

/// Re-attaches a setting's change tracker when dropped.
///
/// Created by [`Setting::suspend_tracking`].
#[must_use = "tracking resumes as soon as the guard is dropped"]
pub struct TrackingSuspension<'a> {
    setting: &'a Setting,
    was_attached: bool,
}

impl Drop for TrackingSuspension<'_> {
    fn drop(&mut self) {
        if self.was_attached {
            self.setting.attach_tracker();
        }
    }
}

/// A read-only view of a setting for GUI and CLI collaborators.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SettingDescriptor {
    /// The setting name
    pub name: String,
    /// The owning group id
    pub group_id: Option<String>,
    /// The declaration position
    pub line_number: Option<u32>,
    /// The fixed kind
    pub kind: SettingKind,
    /// The simple value (index 0)
    pub value: String,
    /// All values
    pub values: Vec<String>,
    /// The default value
    pub default_value: String,
    /// The inclusive lower bound
    pub minimum: Option<f64>,
    /// The inclusive upper bound
    pub maximum: Option<f64>,
    /// The human-readable description
    pub description: String,
    /// The caption written above the setting
    pub caption: Option<String>,
    /// The allowed variants of an Enum setting
    pub variants: Vec<String>,
    /// Whether the setting is excluded from persistence
    pub internal: bool,
    /// Whether the setting has changed since construction
    pub changed: bool,
}

/// Builder for [`Setting`]s with explicit kind and metadata.
///
/// # Examples
///
/// ```
/// use propcfg::domain::Setting;
///
/// let timeout = Setting::integer(30)
///     .named("timeout")
///     .in_group("net.Client")
///     .at_line(10)
///     .with_description("Socket timeout in seconds")
///     .with_bounds(1.0, 300.0)
///     .build()
///     .unwrap();
///
/// timeout.set("900").unwrap();
/// assert_eq!(timeout.value(), "300");
/// ```
#[derive(Clone, Debug)]
pub struct SettingBuilder {
    default: String,
    kind: SettingKind,
    variants: Vec<String>,
    internal: bool,
    name: Option<String>,
    group_id: Option<String>,
    line_number: Option<u32>,
    description: Option<String>,
    caption: Option<String>,
    minimum: Option<f64>,
    maximum: Option<f64>,
    extra_values: Vec<String>,
}

impl SettingBuilder {
    fn new(default: String, kind: SettingKind) -> Self {
        Self {
            default,
            kind,
            variants: Vec::new(),
            internal: false,
            name: None,
            group_id: None,
            line_number: None,
            description: None,
            caption: None,
            minimum: None,
            maximum: None,
            extra_values: Vec::new(),
        }
    }

    /// Sets the setting name, used as its key in the persisted file.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the owning group id.
    pub fn in_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Sets the declaration position used for ordering.
    pub fn at_line(mut self, line_number: u32) -> Self {
        self.line_number = Some(line_number);
        self
    }

    /// Sets the description written above the setting.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets a caption (section header) written above the setting.
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.caption = Some(caption.into());
        self
    }

    /// Sets the inclusive lower bound.
    pub fn with_minimum(mut self, minimum: f64) -> Self {
        self.minimum = Some(minimum);
        self
    }

    /// Sets the inclusive upper bound.
    pub fn with_maximum(mut self, maximum: f64) -> Self {
        self.maximum = Some(maximum);
        self
    }

    /// Sets both inclusive bounds.
    pub fn with_bounds(self, minimum: f64, maximum: f64) -> Self {
        self.with_minimum(minimum).with_maximum(maximum)
    }

    /// Adds values after the default, making this a multi-valued setting.
    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_values.extend(values.into_iter().map(Into::into));
        self
    }

    /// Excludes the setting from persistence and completeness checks.
    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    /// Returns the name given to the builder, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the declaration position given to the builder, if any.
    pub fn line_number(&self) -> Option<u32> {
        self.line_number
    }

    fn invalid(&self, message: impl Into<String>) -> SettingsError {
        SettingsError::InvalidDefinition {
            message: format!(
                "setting '{}': {}",
                self.name.as_deref().unwrap_or("<unnamed>"),
                message.into()
            ),
        }
    }

    /// Builds the setting.
    ///
    /// Fails if the name could not be read back as a file key, if the default
    /// or any extra value does not coerce to the kind, if an Enum has no
    /// variants, or if bounds are given for a non-numeric kind.
    pub fn build(self) -> Result<Setting> {
        if let Some(problem) = self.name.as_deref().and_then(name_problem) {
            return Err(self.invalid(problem));
        }
        if self.kind == SettingKind::Enum && self.variants.is_empty() {
            return Err(self.invalid("enum setting declares no variants"));
        }
        if !self.kind.is_numeric() && (self.minimum.is_some() || self.maximum.is_some()) {
            return Err(self.invalid(format!("bounds are not allowed for {} settings", self.kind)));
        }
        if [self.minimum, self.maximum]
            .iter()
            .flatten()
            .any(|bound| !bound.is_finite())
        {
            return Err(self.invalid("bounds must be finite"));
        }

        let typed = self
            .kind
            .coerce(&self.default, &self.variants)
            .ok_or_else(|| self.invalid(format!("default '{}' is not a valid {}", self.default, self.kind)))?;

        let setting = Setting::from_parts(self.default, typed, self.variants, self.internal);
        {
            let mut state = setting.write_state();
            state.minimum = self.minimum;
            state.maximum = self.maximum;
        }
        if let Some(name) = self.name {
            setting.set_name(name);
        }
        if let Some(group_id) = self.group_id {
            setting.set_group_id(group_id);
        }
        if let Some(line_number) = self.line_number {
            setting.set_line_number(line_number);
        }
        if let Some(description) = self.description {
            setting.set_description(description);
        }
        if let Some(caption) = self.caption {
            setting.set_caption(caption);
        }
        {
            let mut state = setting.write_state();
            for raw in &self.extra_values {
                let typed = setting.coerce(raw, &state)?;
                state.values.push(typed.to_string());
                state.typed.push(typed);
            }
        }
        Ok(setting)
    }

    /// Builds the setting and registers it with its group in `registry`.
    pub fn register(self, registry: &Arc<Registry>) -> Result<Arc<Setting>> {
        registry.register_setting(self.build()?)
    }
}
