//! # Storage Module - Durable Reply State
//!
//! The bot persists exactly one value: the id of the last message it replied
//! to. That value guards against answering the same message twice, including
//! across restarts.
//!
//! ## Layers
//!
//! - [`KeyValueStore`] - minimal durable key/value contract with atomic replace
//! - [`FileStore`] - one file per key under a data directory
//! - [`MemoryStore`] - in-process backend for tests and dry runs
//! - [`ReplyState`] - typed last-replied id on top of any store
//!
//! ## On-disk layout
//!
//! ```text
//! data/
//! └── last_replied.json   ← `null` (nothing answered yet) or `"<message id>"`
//! ```
//!
//! ## Crash safety
//!
//! Writes go to a uniquely named temp file in the same directory, are fsynced,
//! then renamed over the destination while an exclusive lock is held. A crash
//! leaves either the old or the new value. Anything unreadable on load is
//! treated exactly like a missing file.

use fs2::FileExt;
use log::{debug, warn};
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::errors::StateError;
use crate::gateway::MessageId;

/// Durable key/value contract. `put` must replace atomically.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StateError>;
    fn put(&self, key: &str, value: &str) -> Result<(), StateError>;
}

/// Keys name a single file inside the data directory: ASCII letters, digits,
/// `_`, `-` and `.`, not starting with a dot.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.')
}

/// File-per-key store rooted at `data_dir`.
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    /// Open (creating if needed) the data directory.
    pub fn open(data_dir: impl AsRef<Path>) -> Result<Self, StateError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StateError> {
        if !is_valid_key(key) {
            return Err(StateError::InvalidKey(key.to_string()));
        }
        Ok(self.data_dir.join(format!("{}.json", key)))
    }

    /// Replace `path` with `content` via temp file + fsync + rename under an exclusive lock.
    fn write_file_locked(path: &Path, content: &str) -> Result<(), StateError> {
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(path)?;
        lock_file.lock_exclusive()?;

        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let base = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("state.json");
        let mut counter = 0u32;
        let tmp_path = loop {
            let candidate = dir.join(format!(".{}.tmp-{}-{}", base, std::process::id(), counter));
            match OpenOptions::new().write(true).create_new(true).open(&candidate) {
                Ok(mut tmp) => {
                    if let Err(e) = write_and_sync(&mut tmp, content) {
                        let _ = fs::remove_file(&candidate);
                        return Err(e.into());
                    }
                    break candidate;
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    counter = counter.saturating_add(1);
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        };

        if let Err(e) = fs::rename(&tmp_path, path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        // Persist the rename itself (best-effort; not every platform allows opening a dir).
        if let Ok(dir_file) = File::open(dir) {
            let _ = dir_file.sync_all();
        }

        drop(lock_file);
        Ok(())
    }
}

fn write_and_sync(file: &mut File, content: &str) -> std::io::Result<()> {
    file.write_all(content.as_bytes())?;
    file.flush()?;
    file.sync_all()
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StateError> {
        let path = self.key_path(key)?;
        Self::write_file_locked(&path, value)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StateError> {
        let guard = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        Ok(guard.get(key).cloned())
    }

    fn put(&self, key: &str, value: &str) -> Result<(), StateError> {
        let mut guard = self.entries.lock().unwrap_or_else(|p| p.into_inner());
        guard.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Persisted dedup marker. `None` is the sentinel for "nothing answered yet"
/// and is stored as JSON `null`, which no gateway id can collide with.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LastReplied {
    #[default]
    None,
    Id(MessageId),
}

impl LastReplied {
    pub fn matches(&self, id: &MessageId) -> bool {
        matches!(self, LastReplied::Id(last) if last == id)
    }

    fn encode(&self) -> Result<String, StateError> {
        let value: Option<&MessageId> = match self {
            LastReplied::None => None,
            LastReplied::Id(id) => Some(id),
        };
        Ok(serde_json::to_string(&value)?)
    }

    fn decode(raw: &str) -> Result<Self, StateError> {
        let value: Option<MessageId> = serde_json::from_str(raw.trim())?;
        Ok(value.map(LastReplied::Id).unwrap_or(LastReplied::None))
    }
}

/// Typed view of the last-replied id over a [`KeyValueStore`].
///
/// An id whose save failed is held in memory and takes precedence over the
/// stored value until a later write succeeds, so this process never answers
/// it again even while the store is unwritable.
pub struct ReplyState<S: KeyValueStore> {
    store: S,
    key: String,
    unsaved: Mutex<Option<MessageId>>,
}

impl<S: KeyValueStore> ReplyState<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            unsaved: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current marker. Never fails: a missing, unreadable or corrupt value
    /// resets to the sentinel and the sentinel is written back. A remembered
    /// unsaved id wins and its write is retried.
    pub fn load(&self) -> LastReplied {
        let mut unsaved = self.unsaved.lock().unwrap_or_else(|p| p.into_inner());
        if let Some(id) = unsaved.clone() {
            match self.write(&LastReplied::Id(id.clone())) {
                Ok(()) => {
                    debug!("Reply state '{}' caught up to {}", self.key, id);
                    *unsaved = None;
                }
                Err(e) => debug!("Reply state '{}' still unwritable: {}", self.key, e),
            }
            return LastReplied::Id(id);
        }
        drop(unsaved);

        match self.store.get(&self.key) {
            Ok(Some(raw)) => match LastReplied::decode(&raw) {
                Ok(last) => return last,
                Err(e) => warn!("Reply state '{}' unreadable ({}); resetting", self.key, e),
            },
            Ok(None) => debug!("No reply state '{}' yet; initializing", self.key),
            Err(e) => warn!("Reply state '{}' could not be read ({}); resetting", self.key, e),
        }

        if let Err(e) = self.write(&LastReplied::None) {
            warn!("Failed to reinitialize reply state '{}': {}", self.key, e);
        }
        LastReplied::None
    }

    /// Advance the marker to `id`. On error the id is still remembered in memory.
    pub fn save(&self, id: &MessageId) -> Result<(), StateError> {
        let result = self.write(&LastReplied::Id(id.clone()));
        let mut unsaved = self.unsaved.lock().unwrap_or_else(|p| p.into_inner());
        *unsaved = match &result {
            Ok(()) => None,
            Err(_) => Some(id.clone()),
        };
        result
    }

    /// Stored marker without any write-back. `Ok(None)` for a missing value.
    pub fn peek(&self) -> Result<Option<LastReplied>, StateError> {
        match self.store.get(&self.key)? {
            Some(raw) => LastReplied::decode(&raw).map(Some),
            None => Ok(None),
        }
    }

    fn write(&self, value: &LastReplied) -> Result<(), StateError> {
        let encoded = value.encode()?;
        self.store.put(&self.key, &encoded)
    }
}
