//! Durable key-value storage port
//!
//! The conversation store persists through the [`KeyValueStore`] trait, which
//! mirrors the two-entry string storage the chat client was written against.
//! [`MemoryStore`] backs tests and ephemeral sessions; [`SledStore`] backs the
//! CLI with an embedded `sled` database.

use crate::error::{ChatGenieError, Result};
use anyhow::Context;
use directories::ProjectDirs;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Environment variable that overrides the default store location
pub const STORE_PATH_ENV: &str = "CHATGENIE_STORE_PATH";

/// String key-value storage
///
/// Implementations must make `set` durable before returning so that a crash
/// after a mutation does not lose it.
pub trait KeyValueStore: Send + Sync {
    /// Read the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store, lost when dropped
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with the given entries
    ///
    /// # Examples
    ///
    /// ```
    /// use chatgenie::storage::{KeyValueStore, MemoryStore};
    ///
    /// let store = MemoryStore::with_entries([("currentChatId", "default")]);
    /// assert_eq!(store.get("currentChatId").unwrap().as_deref(), Some("default"));
    /// ```
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            entries: Mutex::new(map),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| ChatGenieError::Storage("Memory store lock poisoned".to_string()).into())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Embedded `sled` store
///
/// Values are stored as UTF-8 bytes and flushed after every write.
pub struct SledStore {
    db: sled::Db,
    path: PathBuf,
}

impl SledStore {
    /// Open the store at the default location
    ///
    /// Uses `CHATGENIE_STORE_PATH` when set, otherwise `chat_store` inside the
    /// platform data directory.
    ///
    /// # Errors
    ///
    /// Returns `ChatGenieError::Storage` if the data directory cannot be
    /// determined or the database cannot be opened
    pub fn open_default() -> Result<Self> {
        if let Ok(override_path) = std::env::var(STORE_PATH_ENV) {
            return Self::open(override_path);
        }
        Self::open(default_store_path()?)
    }

    /// Open or create the store at `path`
    ///
    /// Parent directories are created as needed.
    ///
    /// # Errors
    ///
    /// Returns `ChatGenieError::Storage` if the database cannot be opened
    ///
    /// # Examples
    ///
    /// ```
    /// use chatgenie::storage::SledStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = SledStore::open(dir.path().join("chat_store")).unwrap();
    /// ```
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for store")
                .map_err(|e| ChatGenieError::Storage(e.to_string()))?;
        }

        let db = sled::open(&path)
            .map_err(|e| ChatGenieError::Storage(format!("Failed to open database: {}", e)))?;

        tracing::debug!("Opened chat store at {}", path.display());
        Ok(Self { db, path })
    }

    /// Location of the database directory
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for SledStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        match self
            .db
            .get(key.as_bytes())
            .map_err(|e| ChatGenieError::Storage(format!("Get failed: {}", e)))?
        {
            Some(bytes) => {
                let value = String::from_utf8(bytes.to_vec()).map_err(|e| {
                    ChatGenieError::Storage(format!("Stored value is not UTF-8: {}", e))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.db
            .insert(key.as_bytes(), value.as_bytes())
            .map_err(|e| ChatGenieError::Storage(format!("Insert failed: {}", e)))?;

        self.db
            .flush()
            .map_err(|e| ChatGenieError::Storage(format!("Flush failed: {}", e)))?;

        Ok(())
    }
}

/// Default store location inside the platform data directory
///
/// # Errors
///
/// Returns `ChatGenieError::Storage` if no home directory can be determined
pub fn default_store_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("com", "chatgenie", "chatgenie")
        .ok_or_else(|| ChatGenieError::Storage("Could not determine data directory".into()))?;
    Ok(proj_dirs.data_dir().join("chat_store"))
}
