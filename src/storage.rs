//! Key/value storage port.
//!
//! Every persisted collection (engine configurations, custom engines,
//! enabled engines, history, tags, theme) lives under one namespaced key and
//! is rewritten as a whole on each change. Readers never propagate corrupt
//! data: a value that fails to parse is logged and treated as absent, and the
//! caller falls back to its default.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::{DorkError, Result};

/// Engine id → configuration map.
pub const ENGINE_CONFIGS_KEY: &str = "dork_engine_configs";
/// User-added engines, insertion order.
pub const CUSTOM_ENGINES_KEY: &str = "dork_custom_engines";
/// Ids of engines shown in the search form.
pub const ENABLED_ENGINES_KEY: &str = "dork_enabled_engines";
/// Search history, newest first.
pub const SEARCH_HISTORY_KEY: &str = "dork_search_history";
/// User tags.
pub const TAGS_KEY: &str = "dork_search_tags";
/// Theme preference.
pub const THEME_KEY: &str = "dork-theme";

/// A string key/value store.
pub trait Storage: Send + Sync {
    /// Returns the raw value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Deletes `key`. Deleting a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

/// Reads and parses the JSON value under `key`.
///
/// Missing keys, storage failures and corrupt JSON all yield `None`.
pub fn read_json<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let raw = match storage.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!("Failed to read '{}': {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring corrupt value stored under '{}': {}", key, e);
            None
        }
    }
}

/// Serializes `value` and stores it under `key`.
pub fn write_json<T: Serialize + ?Sized>(storage: &dyn Storage, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value)?;
    storage.set(key, &raw)?;
    debug!("Wrote {} bytes to '{}'", raw.len(), key);
    Ok(())
}

/// In-memory store, used in tests and for throwaway sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Returns true if nothing is stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| DorkError::Storage("memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| DorkError::Storage("memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| DorkError::Storage("memory store lock poisoned".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Opens (and creates if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!("Using file storage at {}", dir.display());
        Ok(Self { dir })
    }

    /// Root directory of the store.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(DorkError::Storage(format!("invalid storage key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        // Write to a sibling temp file and rename so readers never see a torn value.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Callback invoked with the key of every successful write or removal.
pub type ChangeListener = Box<dyn Fn(&str) + Send + Sync>;

/// Wraps a store and notifies subscribers after each change.
///
/// Listeners run synchronously once the inner write has returned, so a
/// listener that reads back through the store observes the new value.
pub struct NotifyingStorage<S> {
    inner: S,
    listeners: RwLock<Vec<ChangeListener>>,
}

impl<S: Storage> NotifyingStorage<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Registers a listener.
    pub fn subscribe(&self, listener: impl Fn(&str) + Send + Sync + 'static) -> Result<()> {
        self.listeners
            .write()
            .map_err(|_| DorkError::Storage("listener lock poisoned".to_string()))?
            .push(Box::new(listener));
        Ok(())
    }

    fn notify(&self, key: &str) -> Result<()> {
        let listeners = self
            .listeners
            .read()
            .map_err(|_| DorkError::Storage("listener lock poisoned".to_string()))?;
        for listener in listeners.iter() {
            listener(key);
        }
        Ok(())
    }
}

impl<S: Storage> Storage for NotifyingStorage<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.inner.set(key, value)?;
        self.notify(key)
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.inner.remove(key)?;
        self.notify(key)
    }
}
