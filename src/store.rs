//! Persistent cache store: two JSON namespaces of immutable records
//!
//! Each namespace is one string blob holding a JSON object (`key -> record`).
//! Reads never fail: a missing or unreadable namespace is an empty one.
//! Writes are read-modify-write of the whole namespace and swallow errors.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::state::{EntityRecord, MoveRecord};

pub const ENTITY_NAMESPACE: &str = "pokedex";
pub const MOVE_NAMESPACE: &str = "pokemon-moves";

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("storage io error for {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("namespace {name} is corrupt: {reason}")]
    Corrupt { name: String, reason: String },
    #[error("failed to encode namespace {name}: {source}")]
    Encode {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Named blob storage (the localStorage shape).
pub trait StorageBackend: Send + Sync {
    fn load(&self, name: &str) -> Result<Option<String>, StoreError>;
    fn save(&self, name: &str, contents: &str) -> Result<(), StoreError>;
}

#[derive(Debug, Default)]
pub struct MemoryBackend {
    blobs: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite a blob verbatim.
    pub fn put_raw(&self, name: &str, contents: &str) {
        if let Ok(mut blobs) = self.blobs.lock() {
            blobs.insert(name.to_string(), contents.to_string());
        }
    }

    pub fn get_raw(&self, name: &str) -> Option<String> {
        self.blobs.lock().ok()?.get(name).cloned()
    }
}

impl StorageBackend for MemoryBackend {
    fn load(&self, name: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get_raw(name))
    }

    fn save(&self, name: &str, contents: &str) -> Result<(), StoreError> {
        self.put_raw(name, contents);
        Ok(())
    }
}

/// One `<name>.json` file per namespace under `root`.
#[derive(Clone, Debug)]
pub struct FileBackend {
    root: PathBuf,
}

impl FileBackend {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn load(&self, name: &str) -> Result<Option<String>, StoreError> {
        match std::fs::read_to_string(self.path_for(name)) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                name: name.to_string(),
                source,
            }),
        }
    }

    fn save(&self, name: &str, contents: &str) -> Result<(), StoreError> {
        let io_error = |source| StoreError::Io {
            name: name.to_string(),
            source,
        };
        std::fs::create_dir_all(&self.root).map_err(io_error)?;
        std::fs::write(self.path_for(name), contents).map_err(io_error)
    }
}

#[derive(Clone)]
pub struct CacheStore {
    backend: Arc<dyn StorageBackend>,
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::memory()
    }
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore").finish_non_exhaustive()
    }
}

impl CacheStore {
    pub fn new(backend: Arc<dyn StorageBackend>) -> Self {
        Self { backend }
    }

    pub fn memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    pub fn file(root: impl Into<PathBuf>) -> Self {
        Self::new(Arc::new(FileBackend::new(root)))
    }

    pub fn read_entity(&self, index: usize) -> Option<EntityRecord> {
        self.read(ENTITY_NAMESPACE, &index.to_string())
    }

    pub fn write_entity(&self, index: usize, record: &EntityRecord) {
        self.write(ENTITY_NAMESPACE, &index.to_string(), record);
    }

    pub fn read_move(&self, label: &str) -> Option<MoveRecord> {
        self.read(MOVE_NAMESPACE, label)
    }

    pub fn write_move(&self, label: &str, record: &MoveRecord) {
        self.write(MOVE_NAMESPACE, label, record);
    }

    fn read<R: DeserializeOwned>(&self, namespace: &str, key: &str) -> Option<R> {
        let entries = match self.load_namespace(namespace) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "treating namespace as empty");
                return None;
            }
        };
        let value = entries.get(key)?.clone();
        match serde_json::from_value(value) {
            Ok(record) => {
                debug!(namespace, key, "cache hit");
                Some(record)
            }
            Err(err) => {
                warn!(namespace, key, error = %err, "ignoring malformed cache entry");
                None
            }
        }
    }

    fn write<R: Serialize>(&self, namespace: &str, key: &str, record: &R) {
        if let Err(err) = self.try_write(namespace, key, record) {
            warn!(namespace, key, error = %err, "cache write failed");
        }
    }

    fn try_write<R: Serialize>(&self, namespace: &str, key: &str, record: &R) -> Result<(), StoreError> {
        let encode = |source| StoreError::Encode {
            name: namespace.to_string(),
            source,
        };
        let mut entries = self.load_namespace(namespace).unwrap_or_else(|err| {
            warn!(error = %err, "replacing corrupt namespace");
            Map::new()
        });
        entries.insert(key.to_string(), serde_json::to_value(record).map_err(encode)?);
        let contents = serde_json::to_string(&Value::Object(entries)).map_err(encode)?;
        self.backend.save(namespace, &contents)?;
        debug!(namespace, key, "cache write");
        Ok(())
    }

    fn load_namespace(&self, namespace: &str) -> Result<Map<String, Value>, StoreError> {
        let Some(contents) = self.backend.load(namespace)? else {
            return Ok(Map::new());
        };
        let corrupt = |reason: String| StoreError::Corrupt {
            name: namespace.to_string(),
            reason,
        };
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(entries)) => Ok(entries),
            Ok(other) => Err(corrupt(format!("expected an object, found {}", kind_of(&other)))),
            Err(err) => Err(corrupt(err.to_string())),
        }
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
