// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared helpers for integration tests.

#![allow(dead_code)]

use propcfg::domain::{Registry, Result, Setting, SettingsError, SettingsGroup};
use propcfg::ports::{ConfigPathResolver, SettingsBackend};
use propcfg::service::StorageEngine;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// An in-memory backend that counts reads and writes.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    files: Mutex<HashMap<PathBuf, String>>,
    writes: AtomicUsize,
    reads: AtomicUsize,
    fail_writes: bool,
}

impl MemoryBackend {
    /// Creates an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend whose writes always fail.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Stores `content` as the file at `path`.
    pub fn put(&self, path: impl AsRef<Path>, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), content.to_string());
    }

    /// Returns the content of the file at `path`.
    pub fn content(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files.lock().unwrap().get(path.as_ref()).cloned()
    }

    /// Returns the number of writes attempted.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Returns the number of reads attempted.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

impl SettingsBackend for MemoryBackend {
    fn read(&self, path: &Path) -> Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.content(path).ok_or_else(|| {
            SettingsError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} not found", path.display()),
            ))
        })
    }

    fn write(&self, path: &Path, lines: &[String]) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes {
            return Err(SettingsError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only backend",
            )));
        }
        self.put(path, &lines.concat());
        Ok(())
    }
}

/// An in-memory backend whose writes block until released.
///
/// Every read and write is recorded, so tests can check how operations on
/// different threads were ordered.
#[derive(Debug, Default)]
pub struct GatedBackend {
    inner: MemoryBackend,
    events: Mutex<Vec<String>>,
    released: Mutex<bool>,
    gate: Condvar,
}

impl GatedBackend {
    /// Creates a closed backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded events in order.
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    /// Lets pending and future writes finish.
    pub fn release(&self) {
        *self.released.lock().unwrap() = true;
        self.gate.notify_all();
    }

    /// Waits until `event` was recorded. Returns `false` on timeout.
    pub fn wait_for(&self, event: &str, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if self.events().iter().any(|e| e == event) {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        false
    }

    fn record(&self, event: &str) {
        self.events.lock().unwrap().push(event.to_string());
    }
}

impl SettingsBackend for GatedBackend {
    fn read(&self, path: &Path) -> Result<String> {
        self.record("read");
        self.inner.read(path)
    }

    fn write(&self, path: &Path, lines: &[String]) -> Result<()> {
        self.record("write started");
        let mut released = self.released.lock().unwrap();
        while !*released {
            released = self.gate.wait(released).unwrap();
        }
        drop(released);
        self.record("write finished");
        self.inner.write(path, lines)
    }
}

/// Resolves every file below a virtual `/cfg` root without touching the disk.
#[derive(Debug, Default)]
pub struct VirtualResolver;

impl ConfigPathResolver for VirtualResolver {
    fn resolve(&self, program_name: &str, file_name: &str) -> Result<PathBuf> {
        Ok(Path::new("/cfg").join(program_name).join(file_name))
    }
}

/// Builds an engine over a shared in-memory backend.
pub fn memory_engine(registry: &Arc<Registry>, backend: &Arc<MemoryBackend>) -> StorageEngine {
    StorageEngine::builder()
        .with_program_name("testapp")
        .with_registry(Arc::clone(registry))
        .with_resolver(Box::new(VirtualResolver))
        .with_backend(Box::new(Arc::clone(backend)))
        .build()
        .unwrap()
}

/// The settings of the sample `net.Client` group.
pub struct ClientSettings {
    pub group: SettingsGroup,
    pub host: Arc<Setting>,
    pub timeout: Arc<Setting>,
    pub verbose: Arc<Setting>,
    pub session: Arc<Setting>,
}

/// Declares a `net.Client` group with a string, a bounded integer, a boolean
/// and an internal setting.
pub fn client_group(registry: &Arc<Registry>) -> ClientSettings {
    let mut group = SettingsGroup::new("net.Client", registry);
    let host = group
        .define(
            "host",
            Setting::string("localhost")
                .with_description("Server host name")
                .with_caption("Connection"),
        )
        .unwrap();
    let timeout = group
        .define(
            "timeout",
            Setting::integer(30)
                .with_bounds(1.0, 600.0)
                .with_description("Socket timeout in seconds"),
        )
        .unwrap();
    let verbose = group
        .define(
            "verbose",
            Setting::boolean(false).with_caption("Diagnostics"),
        )
        .unwrap();
    let session = group
        .define("session", Setting::string("").internal())
        .unwrap();
    assert!(group.seal());

    ClientSettings {
        group,
        host,
        timeout,
        verbose,
        session,
    }
}
