//! Durable key/value storage for the preference.
//!
//! [`PreferenceStore`] abstracts the storage so the controller can be tested
//! without touching the filesystem. [`FileStore`] keeps a small JSON object
//! on disk; [`MemoryStore`] keeps it in a map.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde_json::{Map, Value};

use crate::ThemeError;

/// Abstraction over durable string storage.
///
/// Stores hand back whatever was written; validating values is the
/// controller's job.
pub trait PreferenceStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    fn load(&self, key: &str) -> Result<Option<String>, ThemeError>;

    /// Store `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> Result<(), ThemeError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), ThemeError>;
}

impl<S: PreferenceStore + ?Sized> PreferenceStore for Arc<S> {
    fn load(&self, key: &str) -> Result<Option<String>, ThemeError> {
        (**self).load(key)
    }

    fn save(&self, key: &str, value: &str) -> Result<(), ThemeError> {
        (**self).save(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), ThemeError> {
        (**self).remove(key)
    }
}

// === Real implementation ===

/// Store backed by a JSON object file, e.g. `{"theme": "dark"}`.
///
/// The file is read on every load so that changes made by another process
/// (another CLI invocation) are seen. A missing file is an empty store, and
/// so is a file that is not a JSON object; the next save replaces it.
/// Other keys are written back untouched whatever their JSON type; a key
/// whose value is not a string loads as absent.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a store over the file at `path`; the file is created on first save.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// The state file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<Map<String, Value>, ThemeError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(ThemeError::io(&self.path, e)),
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(entries)) => Ok(entries),
            Ok(_) => {
                tracing::warn!(path = %self.path.display(), "ignoring state file that is not a JSON object");
                Ok(Map::new())
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable state file");
                Ok(Map::new())
            }
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> Result<(), ThemeError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| ThemeError::io(parent, e))?;
        }
        let mut json = serde_json::to_string_pretty(entries)?;
        json.push('\n');
        fs::write(&self.path, json).map_err(|e| ThemeError::io(&self.path, e))
    }
}

impl PreferenceStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, ThemeError> {
        let entries = self.read_entries()?;
        Ok(entries.get(key).and_then(Value::as_str).map(str::to_string))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), ThemeError> {
        let mut entries = self.read_entries()?;
        if entries.get(key).and_then(Value::as_str) == Some(value) {
            return Ok(());
        }
        entries.insert(key.to_string(), Value::String(value.to_string()));
        self.write_entries(&entries)?;
        tracing::debug!(path = %self.path.display(), key, value, "saved preference");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ThemeError> {
        let mut entries = self.read_entries()?;
        if entries.remove(key).is_none() {
            return Ok(());
        }
        self.write_entries(&entries)?;
        tracing::debug!(path = %self.path.display(), key, "removed preference");
        Ok(())
    }
}

// === In-memory implementation ===

/// Store kept in memory.
///
/// Clones share the same map, so a test can keep one handle while the
/// controller owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.lock().insert(key.into(), value.into());
        self
    }

    /// Read an entry without going through the trait.
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, ThemeError> {
        Ok(self.get(key))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), ThemeError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), ThemeError> {
        self.lock().remove(key);
        Ok(())
    }
}
