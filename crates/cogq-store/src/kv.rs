//! Key-value storage port and its backends.
//!
//! The progress store only needs `get`, `set` and `remove` on string values.
//! Backends offer no transactions across keys.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use thiserror::Error;

/// Failures of a storage backend
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading or writing the backing file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A value could not be serialized or the backing file could not be encoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A writer panicked while holding the backend lock
    #[error("Storage backend lock poisoned")]
    Poisoned,
}

/// Result of a storage operation.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Synchronous, process-wide string storage.
pub trait KeyValueStore: Send + Sync + fmt::Debug {
    /// The value stored under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// On error the previous value stays visible.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<()>;
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>> {
    mutex.lock().map_err(|_| StoreError::Poisoned)
}

/// Volatile store, used by tests and hosts that do not persist.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// An empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate a store, e.g. with data written by an older version.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: Mutex::new(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        lock(&self.entries)?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        lock(&self.entries)?.remove(key);
        Ok(())
    }
}

/// Store backed by a single JSON object file.
///
/// All entries are held in memory and the whole file is rewritten on every
/// change. A change becomes visible only once the file write succeeds.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl JsonFileStore {
    /// Open the store at `path`.
    ///
    /// A missing file starts an empty store. A file that does not parse is
    /// logged and treated as empty; it is overwritten on the next write.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let entries = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            match serde_json::from_str(&contents) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Ignoring unreadable store file: {e}");
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let contents = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.entries)?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = lock(&self.entries)?;
        let mut staged = entries.clone();
        staged.insert(key.to_string(), value.to_string());
        self.flush(&staged)?;
        *entries = staged;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        let mut entries = lock(&self.entries)?;
        if !entries.contains_key(key) {
            return Ok(());
        }

        let mut staged = entries.clone();
        staged.remove(key);
        self.flush(&staged)?;
        *entries = staged;
        Ok(())
    }
}
