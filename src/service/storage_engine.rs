// SPDX-License-Identifier: MIT OR Apache-2.0

//! File-per-group storage engine.
//!
//! The engine persists each group of settings to its own key-value file
//! named after the group's simple name, and restores them again without
//! marking anything as changed.

use crate::adapters::properties_file::{render_comment, strip_quotes, unescape};
use crate::adapters::{FileBackend, PropertiesParser, ProjectDirsResolver};
use crate::domain::registry::group_simple_name;
use crate::domain::{
    GroupOutcome, Registry, Result, Setting, SettingKind, SettingsError, SettingsStorage,
    TrackingSuspension,
};
use crate::ports::{ConfigPathResolver, SettingsBackend, SettingsParser};
use crate::service::ordered_writer::OrderedWriter;
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};

const DEFAULT_EXTENSION: &str = "properties";

/// Saves and loads groups of settings.
///
/// Every group maps to one file, `<simple name>.<extension>`, in the folder
/// the resolver picks for the program. Saves and loads of the same group are
/// serialized by a per-group lock; different groups proceed independently.
///
/// # Examples
///
/// ```rust
/// use propcfg::prelude::*;
/// use propcfg::adapters::DirectoryResolver;
/// use std::sync::Arc;
///
/// # fn main() -> Result<()> {
/// let dir = std::env::temp_dir().join("propcfg-engine-doc");
/// let registry = Arc::new(Registry::new());
/// let mut group = SettingsGroup::new("net.Client", &registry);
/// let timeout = group.define("timeout", Setting::integer(30))?;
/// group.seal();
///
/// let engine = StorageEngine::builder()
///     .with_program_name("myapp")
///     .with_registry(Arc::clone(&registry))
///     .with_resolver(Box::new(DirectoryResolver::new(&dir)))
///     .build()?;
///
/// timeout.set("45")?;
/// assert_eq!(engine.save_group("net.Client")?, GroupOutcome::Saved);
/// assert!(engine.load_group("net.Client")?.is_complete());
/// # Ok(())
/// # }
/// ```
pub struct StorageEngine {
    registry: Arc<Registry>,
    resolver: Box<dyn ConfigPathResolver>,
    backend: Box<dyn SettingsBackend>,
    parser: Box<dyn SettingsParser>,
    program_name: String,
    extension: String,
    skip_unchanged: bool,
    group_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl StorageEngine {
    /// Creates a new storage engine builder.
    pub fn builder() -> StorageEngineBuilder {
        StorageEngineBuilder::new()
    }

    /// Returns the registry the engine reads group settings from.
    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Returns the program name used for path resolution and file headers.
    pub fn program_name(&self) -> &str {
        &self.program_name
    }

    /// Returns `true` if saves of unchanged groups are skipped.
    pub fn skips_unchanged(&self) -> bool {
        self.skip_unchanged
    }

    /// Returns the file name of a group, e.g. `Client.properties` for `net.Client`.
    pub fn file_name(&self, group_id: &str) -> String {
        format!("{}.{}", group_simple_name(group_id), self.extension)
    }

    /// Resolves the persisted file of a group, creating it if needed.
    pub fn path_of(&self, group_id: &str) -> Result<PathBuf> {
        self.resolver
            .resolve(&self.program_name, &self.file_name(group_id))
    }

    /// Returns the persisted file of a group without creating it.
    pub fn locate(&self, group_id: &str) -> Result<PathBuf> {
        self.resolver
            .locate(&self.program_name, &self.file_name(group_id))
    }

    /// Creates a watcher for a group's file.
    ///
    /// Pass a callback that calls [`SettingsStorage::load_group`] to pick up
    /// edits made outside the program.
    #[cfg(feature = "reload")]
    pub fn watcher_for(
        &self,
        group_id: &str,
        debounce_delay: Option<std::time::Duration>,
    ) -> Result<crate::adapters::GroupFileWatcher> {
        crate::adapters::GroupFileWatcher::new(group_id, self.path_of(group_id)?, debounce_delay)
    }

    /// Saves every known group. Returns `true` only if all of them succeeded.
    pub fn save_all(&self) -> bool {
        self.registry
            .all_group_ids()
            .iter()
            .fold(true, |ok, group_id| {
                report(group_id, "save", self.save_group(group_id)) && ok
            })
    }

    /// Loads every known group. Returns `false` if any file could not be read.
    pub fn load_all(&self) -> bool {
        self.registry
            .all_group_ids()
            .iter()
            .fold(true, |ok, group_id| {
                report(group_id, "load", self.load_group(group_id)) && ok
            })
    }

    fn group_lock(&self, group_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self
            .group_locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(group_id.to_string()).or_default())
    }

    /// Groups settings by group id. Settings without a group are returned apart.
    fn partition(
        settings: &[Arc<Setting>],
    ) -> (BTreeMap<String, Vec<Arc<Setting>>>, Vec<Arc<Setting>>) {
        let mut groups: BTreeMap<String, Vec<Arc<Setting>>> = BTreeMap::new();
        let mut orphans = Vec::new();
        for setting in settings {
            match setting.group_id() {
                Some(group_id) => groups
                    .entry(group_id.to_string())
                    .or_default()
                    .push(Arc::clone(setting)),
                None => orphans.push(Arc::clone(setting)),
            }
        }
        (groups, orphans)
    }

    fn save_settings(
        &self,
        group_id: &str,
        settings: &[Arc<Setting>],
        captions: &HashMap<String, String>,
    ) -> Result<GroupOutcome> {
        let lock = self.group_lock(group_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        let persisted: Vec<&Arc<Setting>> = settings.iter().filter(|s| !s.is_internal()).collect();
        if self.skip_unchanged && !persisted.iter().any(|s| s.is_changed()) {
            debug!("Group {} is unchanged, skipping save", group_id);
            return Ok(GroupOutcome::Skipped);
        }

        let path = self.path_of(group_id)?;
        let mut writer = OrderedWriter::new();
        for setting in &persisted {
            writer.add_setting(setting);
        }
        writer.add_captions(captions);

        let mut lines = Vec::with_capacity(writer.len() + 1);
        lines.push(render_comment(
            "# ",
            &format!(
                "{} settings: {}",
                self.program_name,
                group_simple_name(group_id)
            ),
        ));
        lines.extend(writer.rendered_lines());

        self.backend.write(&path, &lines)?;
        debug!(
            "Saved {} setting(s) of group {} to {}",
            persisted.len(),
            group_id,
            path.display()
        );
        Ok(GroupOutcome::Saved)
    }

    /// Reads and parses a group's file. A missing file is an I/O error.
    fn read_group_file(&self, group_id: &str) -> Result<HashMap<String, String>> {
        let path = self.locate(group_id)?;
        let content = self.backend.read(&path)?;
        self.parser.parse(&content).map_err(|e| match e {
            SettingsError::ParseError { line, message, .. } => SettingsError::ParseError {
                path: Some(path.clone()),
                line,
                message,
            },
            other => other,
        })
    }

    fn load_settings(&self, group_id: &str, settings: &[Arc<Setting>]) -> Result<GroupOutcome> {
        let lock = self.group_lock(group_id);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        // Restoring values is not a user edit
        let suspensions: Vec<TrackingSuspension<'_>> =
            settings.iter().map(|s| s.suspend_tracking()).collect();

        let entries = match self.read_group_file(group_id) {
            Ok(entries) => entries,
            Err(e) => {
                drop(suspensions);
                self.registry.mark_load_problem(group_id);
                return Err(e);
            }
        };

        let mut missing = Vec::new();
        for setting in settings {
            let name = setting.name();
            let values = file_values(&entries, setting);
            if values.is_empty() {
                if !setting.is_internal() {
                    let missing_key = SettingsError::MissingKey {
                        group: group_id.to_string(),
                        key: name.to_string(),
                    };
                    debug!("{}, using the default", missing_key);
                    missing.push(name.to_string());
                }
                restore_default(setting);
                continue;
            }
            if let Err(e) = apply_values(setting, &values) {
                warn!("Using default for {} in group {}: {}", name, group_id, e);
                restore_default(setting);
                if !setting.is_internal() {
                    missing.push(name.to_string());
                }
            }
        }

        for key in entries.keys() {
            let base = key.split('[').next().unwrap_or(key);
            if !settings.iter().any(|s| s.name() == base) {
                debug!("Ignoring unknown key {} in group {}", key, group_id);
            }
        }

        drop(suspensions);
        if missing.is_empty() {
            self.registry.mark_loaded(group_id);
            debug!("Loaded group {}", group_id);
            Ok(GroupOutcome::Loaded)
        } else {
            self.registry.mark_load_problem(group_id);
            debug!("Loaded group {} with {} missing key(s)", group_id, missing.len());
            Ok(GroupOutcome::LoadedIncomplete { missing })
        }
    }
}

impl SettingsStorage for StorageEngine {
    fn save(&self, settings: &[Arc<Setting>]) -> bool {
        let (groups, orphans) = Self::partition(settings);
        let mut ok = orphans.is_empty();
        for orphan in &orphans {
            warn!("Cannot save setting {} without a group", orphan.name());
        }
        for (group_id, settings) in &groups {
            let captions = settings
                .iter()
                .filter_map(|s| s.caption().map(|c| (s.name().to_string(), c.to_string())))
                .collect();
            ok &= report(group_id, "save", self.save_settings(group_id, settings, &captions));
        }
        ok
    }

    fn load(&self, settings: &[Arc<Setting>]) -> bool {
        let (groups, orphans) = Self::partition(settings);
        let mut ok = orphans.is_empty();
        for orphan in &orphans {
            warn!("Cannot load setting {} without a group", orphan.name());
        }
        for (group_id, settings) in &groups {
            ok &= report(group_id, "load", self.load_settings(group_id, settings));
        }
        ok
    }

    fn save_group(&self, group_id: &str) -> Result<GroupOutcome> {
        let settings = self.registry.settings_of(group_id);
        let captions = self.registry.captions_of(group_id);
        self.save_settings(group_id, &settings, &captions)
    }

    fn load_group(&self, group_id: &str) -> Result<GroupOutcome> {
        let settings = self.registry.settings_of(group_id);
        self.load_settings(group_id, &settings)
    }
}

impl std::fmt::Debug for StorageEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageEngine")
            .field("program_name", &self.program_name)
            .field("extension", &self.extension)
            .field("skip_unchanged", &self.skip_unchanged)
            .finish_non_exhaustive()
    }
}

/// Logs a failed group operation and flattens the outcome to a flag.
///
/// Incomplete loads count as success; they are recorded on the group.
fn report(group_id: &str, operation: &str, outcome: Result<GroupOutcome>) -> bool {
    match outcome {
        Ok(_) => true,
        Err(e) => {
            warn!("Failed to {} group {}: {}", operation, group_id, e);
            false
        }
    }
}

/// Collects a setting's values from the parsed file, index 0 first.
///
/// Returns nothing if the plain key is absent. Gaps in the indices are closed.
fn file_values(entries: &HashMap<String, String>, setting: &Setting) -> Vec<String> {
    let name = setting.name();
    let Some(first) = entries.get(name) else {
        return Vec::new();
    };

    let mut indexed: Vec<(usize, &String)> = entries
        .iter()
        .filter_map(|(key, value)| {
            let index = key
                .strip_prefix(name)?
                .strip_prefix('[')?
                .strip_suffix(']')?
                .parse::<usize>()
                .ok()?;
            (index > 0).then_some((index, value))
        })
        .collect();
    indexed.sort_by_key(|(index, _)| *index);

    std::iter::once(first)
        .chain(indexed.into_iter().map(|(_, value)| value))
        .map(|raw| unquote(setting.kind(), raw))
        .collect()
}

fn unquote(kind: SettingKind, raw: &str) -> String {
    if kind.is_quoted() {
        unescape(strip_quotes(raw))
    } else {
        unescape(raw)
    }
}

/// Replaces a setting's whole list with `values`.
///
/// Coercion is checked for every value before anything is mutated.
fn apply_values(setting: &Setting, values: &[String]) -> Result<()> {
    if let Some(bad) = values
        .iter()
        .find(|v| setting.kind().coerce(v, setting.variants()).is_none())
    {
        return Err(SettingsError::type_mismatch(setting.name(), setting.kind(), bad));
    }

    for (index, value) in values.iter().enumerate() {
        if index < setting.len() {
            setting.set_at(index, value)?;
        } else if !setting.append(value) {
            return Err(SettingsError::type_mismatch(setting.name(), setting.kind(), value));
        }
    }
    setting.truncate(values.len());
    Ok(())
}

fn restore_default(setting: &Setting) {
    setting.truncate(1);
    if let Err(e) = setting.reset_to_default() {
        warn!("Cannot restore default of {}: {}", setting.name(), e);
    }
}

/// Builder for creating a storage engine.
///
/// # Examples
///
/// ```rust
/// use propcfg::service::StorageEngine;
/// use propcfg::adapters::DirectoryResolver;
///
/// # fn main() -> propcfg::domain::Result<()> {
/// let engine = StorageEngine::builder()
///     .with_program_name("myapp")
///     .with_resolver(Box::new(DirectoryResolver::new(std::env::temp_dir())))
///     .with_extension("cfg")
///     .skip_unchanged(false)
///     .build()?;
/// assert_eq!(engine.file_name("net.Client"), "Client.cfg");
/// # Ok(())
/// # }
/// ```
pub struct StorageEngineBuilder {
    registry: Option<Arc<Registry>>,
    resolver: Option<Box<dyn ConfigPathResolver>>,
    backend: Option<Box<dyn SettingsBackend>>,
    parser: Option<Box<dyn SettingsParser>>,
    program_name: Option<String>,
    extension: String,
    skip_unchanged: bool,
}

impl StorageEngineBuilder {
    /// Creates a new builder with change-skip enabled and the default extension.
    pub fn new() -> Self {
        Self {
            registry: None,
            resolver: None,
            backend: None,
            parser: None,
            program_name: None,
            extension: DEFAULT_EXTENSION.to_string(),
            skip_unchanged: true,
        }
    }

    /// Sets the program name. Required.
    pub fn with_program_name(mut self, program_name: impl Into<String>) -> Self {
        self.program_name = Some(program_name.into());
        self
    }

    /// Sets the registry. Defaults to [`Registry::global`].
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Sets the path resolver. Defaults to the platform configuration folder.
    pub fn with_resolver(mut self, resolver: Box<dyn ConfigPathResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Sets the file backend. Defaults to [`FileBackend`].
    pub fn with_backend(mut self, backend: Box<dyn SettingsBackend>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Sets the file parser. Defaults to [`PropertiesParser`].
    pub fn with_parser(mut self, parser: Box<dyn SettingsParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    /// Sets the file extension, without the leading dot.
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Enables or disables skipping saves of groups with no changed setting.
    pub fn skip_unchanged(mut self, skip: bool) -> Self {
        self.skip_unchanged = skip;
        self
    }

    /// Builds the storage engine.
    ///
    /// Fails if no program name was given or the extension is empty.
    pub fn build(self) -> Result<StorageEngine> {
        let program_name = self
            .program_name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| SettingsError::InvalidDefinition {
                message: "storage engine needs a program name".to_string(),
            })?;
        let extension = self.extension.trim_start_matches('.').to_string();
        if extension.is_empty() {
            return Err(SettingsError::InvalidDefinition {
                message: "storage engine needs a file extension".to_string(),
            });
        }

        let parser = self
            .parser
            .unwrap_or_else(|| Box::new(PropertiesParser::new()));
        if !parser.supported_extensions().contains(&extension.as_str()) {
            warn!(
                "Extension '{}' is not one the parser expects ({:?})",
                extension,
                parser.supported_extensions()
            );
        }

        Ok(StorageEngine {
            registry: self.registry.unwrap_or_else(Registry::global),
            resolver: self
                .resolver
                .unwrap_or_else(|| Box::new(ProjectDirsResolver::default())),
            backend: self.backend.unwrap_or_else(|| Box::new(FileBackend::new())),
            parser,
            program_name,
            extension,
            skip_unchanged: self.skip_unchanged,
            group_locks: Mutex::new(HashMap::new()),
        })
    }
}

impl Default for StorageEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::DirectoryResolver;
    use crate::domain::SettingsGroup;
    use std::fs;
    use tempfile::TempDir;

    fn engine_in(dir: &TempDir, registry: &Arc<Registry>) -> StorageEngine {
        StorageEngine::builder()
            .with_program_name("myapp")
            .with_registry(Arc::clone(registry))
            .with_resolver(Box::new(DirectoryResolver::new(dir.path())))
            .build()
            .unwrap()
    }

    fn group_file(dir: &TempDir, name: &str) -> PathBuf {
        dir.path().join("myapp").join(format!("{}.properties", name))
    }

    #[test]
    fn test_builder_requires_program_name() {
        let result = StorageEngine::builder().build();
        assert!(matches!(result, Err(SettingsError::InvalidDefinition { .. })));
        let result = StorageEngine::builder()
            .with_program_name("app")
            .with_extension(".")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_defaults() {
        let engine = StorageEngine::builder()
            .with_program_name("app")
            .with_extension(".props")
            .build()
            .unwrap();
        assert!(engine.skips_unchanged());
        assert_eq!(engine.program_name(), "app");
        assert_eq!(engine.file_name("a.b.Client"), "Client.props");
        assert!(Arc::ptr_eq(engine.registry(), &Registry::global()));
    }

    #[test]
    fn test_save_writes_header_and_settings() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(Registry::new());
        let mut group = SettingsGroup::new("net.Client", &registry);
        let timeout = group
            .define(
                "timeout",
                Setting::integer(30)
                    .with_description("Socket timeout")
                    .with_caption("Connection"),
            )
            .unwrap();
        group.define("host", Setting::string("localhost")).unwrap();
        group.define("token", Setting::string("").internal()).unwrap();

        timeout.set("45").unwrap();
        let engine = engine_in(&dir, &registry);
        assert_eq!(engine.save_group("net.Client").unwrap(), GroupOutcome::Saved);

        let content = fs::read_to_string(group_file(&dir, "Client")).unwrap();
        assert_eq!(
            content,
            "# myapp settings: Client\n\
             # Connection\n\
             #Socket timeout (default = 30)\n\
             timeout=45\n\
             #(default = localhost)\n\
             host=\"localhost\"\n"
        );
    }

    #[test]
    fn test_save_skips_unchanged_group() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(Registry::new());
        let mut group = SettingsGroup::new("Client", &registry);
        group.define("timeout", Setting::integer(30)).unwrap();

        let engine = engine_in(&dir, &registry);
        assert_eq!(engine.save_group("Client").unwrap(), GroupOutcome::Skipped);
        assert!(!group_file(&dir, "Client").exists());
    }

    #[test]
    fn test_changed_internal_setting_does_not_force_save() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(Registry::new());
        let mut group = SettingsGroup::new("Client", &registry);
        group.define("timeout", Setting::integer(30)).unwrap();
        let session = group.define("session", Setting::integer(0).internal()).unwrap();

        session.set("7").unwrap();
        let engine = engine_in(&dir, &registry);
        assert_eq!(engine.save_group("Client").unwrap(), GroupOutcome::Skipped);
    }

    #[test]
    fn test_round_trip_restores_values_without_marking_changes() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(Registry::new());
        let mut group = SettingsGroup::new("Client", &registry);
        let host = group.define("host", Setting::string("localhost")).unwrap();
        let retries = group.define("retries", Setting::integer(3)).unwrap();
        let engine = engine_in(&dir, &registry);

        host.set("example.org").unwrap();
        assert_eq!(engine.save_group("Client").unwrap(), GroupOutcome::Saved);

        let fresh_registry = Arc::new(Registry::new());
        let mut fresh = SettingsGroup::new("Client", &fresh_registry);
        let fresh_host = fresh.define("host", Setting::string("localhost")).unwrap();
        let fresh_retries = fresh.define("retries", Setting::integer(3)).unwrap();
        let fresh_engine = engine_in(&dir, &fresh_registry);

        assert_eq!(fresh_engine.load_group("Client").unwrap(), GroupOutcome::Loaded);
        assert_eq!(fresh_host.value(), "example.org");
        assert_eq!(fresh_retries.value(), retries.value());
        assert!(!fresh_host.is_changed());
        assert!(!fresh_registry.is_changed("Client"));
        assert!(fresh_registry.is_loaded("Client"));
        assert!(fresh_host.is_tracking());

        assert!(engine.load_group("Client").unwrap().is_complete());
        assert!(host.is_changed());
    }

    #[test]
    fn test_load_missing_key_uses_default() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(Registry::new());
        let mut group = SettingsGroup::new("Client", &registry);
        let timeout = group.define("timeout", Setting::integer(30)).unwrap();
        let host = group.define("host", Setting::string("localhost")).unwrap();
        let engine = engine_in(&dir, &registry);

        timeout.set("99").unwrap();
        let path = engine.path_of("Client").unwrap();
        fs::write(&path, "host=\"example.org\"\n").unwrap();

        let outcome = engine.load_group("Client").unwrap();
        assert_eq!(
            outcome,
            GroupOutcome::LoadedIncomplete {
                missing: vec!["timeout".to_string()]
            }
        );
        assert_eq!(timeout.value(), "30");
        assert_eq!(host.value(), "example.org");
        assert!(registry.has_load_problem("Client"));
    }

    #[test]
    fn test_load_failure_keeps_values() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(Registry::new());
        let mut group = SettingsGroup::new("Client", &registry);
        let timeout = group.define("timeout", Setting::integer(30)).unwrap();
        let engine = engine_in(&dir, &registry);

        timeout.set("99").unwrap();
        fs::write(engine.path_of("Client").unwrap(), "timeout=10\nnot a setting\n").unwrap();

        let result = engine.load_group("Client");
        match result {
            Err(SettingsError::ParseError { path, line, .. }) => {
                assert_eq!(line, 2);
                assert_eq!(path, Some(group_file(&dir, "Client")));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(timeout.value(), "99");
        assert!(timeout.is_tracking());
        assert!(registry.has_load_problem("Client"));
        assert!(!engine.load(group.settings()));
    }

    #[test]
    fn test_load_missing_file_keeps_values() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(Registry::new());
        let mut group = SettingsGroup::new("Client", &registry);
        let timeout = group.define("timeout", Setting::integer(30)).unwrap();
        let engine = engine_in(&dir, &registry);

        timeout.set("99").unwrap();

        match engine.load_group("Client") {
            Err(SettingsError::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(timeout.value(), "99");
        assert!(timeout.is_tracking());
        assert!(registry.has_load_problem("Client"));
        assert!(!group_file(&dir, "Client").exists());
        assert_eq!(engine.locate("Client").unwrap(), group_file(&dir, "Client"));
    }

    #[test]
    fn test_multi_line_value_round_trip() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(Registry::new());
        let mut group = SettingsGroup::new("Client", &registry);
        let motd = group.define("motd", Setting::string("")).unwrap();
        let port = group.define("port", Setting::integer(80)).unwrap();
        let engine = engine_in(&dir, &registry);

        motd.set("line1\nline2").unwrap();
        port.set("8080").unwrap();
        assert_eq!(engine.save_group("Client").unwrap(), GroupOutcome::Saved);

        motd.set("other").unwrap();
        port.set("1").unwrap();
        assert_eq!(engine.load_group("Client").unwrap(), GroupOutcome::Loaded);
        assert_eq!(motd.value(), "line1\nline2");
        assert_eq!(port.value(), "8080");
    }

    #[test]
    fn test_load_rejected_value_falls_back_to_default() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(Registry::new());
        let mut group = SettingsGroup::new("Client", &registry);
        let timeout = group.define("timeout", Setting::integer(30)).unwrap();
        let engine = engine_in(&dir, &registry);

        fs::write(engine.path_of("Client").unwrap(), "timeout=soon\n").unwrap();

        assert!(!engine.load_group("Client").unwrap().is_complete());
        assert_eq!(timeout.value(), "30");
    }

    #[test]
    fn test_list_setting_round_trip() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(Registry::new());
        let mut group = SettingsGroup::new("Client", &registry);
        let ports = group
            .define("ports", Setting::integer(80).with_values(["443"]))
            .unwrap();
        let engine = engine_in(&dir, &registry);

        assert!(ports.append("8080"));
        engine.save_group("Client").unwrap();
        let content = fs::read_to_string(group_file(&dir, "Client")).unwrap();
        assert!(content.contains("ports=80\nports[1]=443\nports[2]=8080\n"));

        fs::write(
            engine.path_of("Client").unwrap(),
            "ports=81\nports[3]=9000\n",
        )
        .unwrap();
        engine.load_group("Client").unwrap();
        assert_eq!(ports.values(), vec!["81".to_string(), "9000".to_string()]);
    }

    #[test]
    fn test_load_strips_quotes_only_for_strings() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(Registry::new());
        let mut group = SettingsGroup::new("Client", &registry);
        let host = group.define("host", Setting::string("localhost")).unwrap();
        let name = group.define("name", Setting::string("")).unwrap();
        let engine = engine_in(&dir, &registry);

        fs::write(engine.path_of("Client").unwrap(), "host=bare.org\nname=\"\"\n").unwrap();

        assert_eq!(engine.load_group("Client").unwrap(), GroupOutcome::Loaded);
        assert_eq!(host.value(), "bare.org");
        assert_eq!(name.value(), "");
    }

    #[test]
    fn test_save_and_load_all() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(Registry::new());
        let mut client = SettingsGroup::new("net.Client", &registry);
        let mut server = SettingsGroup::new("net.Server", &registry);
        let timeout = client.define("timeout", Setting::integer(30)).unwrap();
        let port = server.define("port", Setting::integer(8080)).unwrap();
        let engine = engine_in(&dir, &registry);

        timeout.set("31").unwrap();
        port.set("8081").unwrap();
        assert!(engine.save_all());
        assert!(group_file(&dir, "Client").exists());
        assert!(group_file(&dir, "Server").exists());

        assert!(engine.load_all());
        assert!(registry.is_loaded("net.Client"));
        assert!(registry.is_loaded("net.Server"));
        assert!(!registry.has_load_problem("net.Server"));
    }

    #[test]
    fn test_orphan_settings_fail_aggregate_operations() {
        let dir = TempDir::new().unwrap();
        let registry = Arc::new(Registry::new());
        let orphan = Arc::new(Setting::integer(1).named("orphan").build().unwrap());
        let engine = engine_in(&dir, &registry);

        assert!(!engine.save(&[Arc::clone(&orphan)]));
        assert!(!engine.load(&[orphan]));
    }
}
