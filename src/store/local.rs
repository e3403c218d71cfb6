//! Device-wide settings in a synchronous key-value store

use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::{Scope, SettingsStore, StoreError};
use crate::constants::config::TILES_SETTINGS_KEY;
use crate::settings::{decode_stored, TileSettings};

/// Synchronous key-value persistence
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;
    fn set(&self, key: &str, value: Value) -> Result<(), StoreError>;
}

/// In-memory key-value store (session only)
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: RefCell<HashMap<String, Value>>,
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}

/// Key-value store backed by a single JSON object file
///
/// Every call reads the file so edits by other processes are observed.
#[derive(Debug, Clone)]
pub struct JsonFileKv {
    path: PathBuf,
}

impl JsonFileKv {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store file under the platform data directory
    pub fn default_path() -> PathBuf {
        let mut path = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(crate::constants::config::APP_DIR);
        path.push(crate::constants::config::STORE_FILENAME);
        path
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }

    fn load_object(&self) -> Result<Map<String, Value>, StoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => return Err(self.io_error(err)),
        };

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                warn!(path = ?self.path, "Store file is not a JSON object, treating it as empty");
                Ok(Map::new())
            }
        }
    }
}

impl KeyValueStore for JsonFileKv {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.load_object()?.remove(key))
    }

    fn set(&self, key: &str, value: Value) -> Result<(), StoreError> {
        let mut object = self.load_object()?;
        object.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let contents = serde_json::to_string_pretty(&Value::Object(object))?;
        fs::write(&self.path, contents).map_err(|err| self.io_error(err))?;

        debug!(path = ?self.path, key, "Wrote store entry");
        Ok(())
    }
}

/// Local settings store: one value under a well-known key, scope ignored
#[derive(Debug)]
pub struct LocalStore<K> {
    kv: K,
}

impl<K: KeyValueStore> LocalStore<K> {
    pub fn new(kv: K) -> Self {
        Self { kv }
    }

    /// Synchronous read; corrupt values decode as `None`
    pub fn get(&self) -> Result<Option<TileSettings>, StoreError> {
        Ok(self
            .kv
            .get(TILES_SETTINGS_KEY)?
            .and_then(|value| decode_stored(&value)))
    }

    /// Synchronous write
    pub fn set(&self, settings: &TileSettings) -> Result<(), StoreError> {
        let value = serde_json::to_value(settings)?;
        self.kv.set(TILES_SETTINGS_KEY, value)?;
        info!(tiles = settings.order.len(), "Saved tile settings locally");
        Ok(())
    }
}

impl<K: KeyValueStore> SettingsStore for LocalStore<K> {
    async fn read(&self, _scope: &Scope) -> Result<Option<TileSettings>, StoreError> {
        self.get()
    }

    async fn write(&self, _scope: &Scope, settings: &TileSettings) -> Result<(), StoreError> {
        self.set(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> TileSettings {
        TileSettings {
            order: vec!["B".to_string(), "A".to_string()],
            visible: [("A".to_string(), false)].into_iter().collect(),
        }
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let store = LocalStore::new(MemoryKv::default());
        assert!(store.get().unwrap().is_none());

        store.set(&sample()).unwrap();
        assert_eq!(store.get().unwrap(), Some(sample()));
    }

    #[test]
    fn test_corrupt_value_reads_as_none() {
        let kv = MemoryKv::default();
        kv.set(TILES_SETTINGS_KEY, json!("garbage")).unwrap();
        let store = LocalStore::new(kv);
        assert!(store.get().unwrap().is_none());
    }

    #[test]
    fn test_file_store_persists_and_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");
        let kv = JsonFileKv::new(path.clone());
        kv.set("theme", json!("dark")).unwrap();

        let store = LocalStore::new(kv);
        store.set(&sample()).unwrap();

        let reopened = LocalStore::new(JsonFileKv::new(path.clone()));
        assert_eq!(reopened.get().unwrap(), Some(sample()));

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], json!("dark"));
        assert_eq!(raw[TILES_SETTINGS_KEY]["order"], json!(["B", "A"]));
    }

    #[test]
    fn test_file_store_tolerates_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "{{{ not json").unwrap();

        let store = LocalStore::new(JsonFileKv::new(path));
        assert!(store.get().unwrap().is_none());

        store.set(&sample()).unwrap();
        assert_eq!(store.get().unwrap(), Some(sample()));
    }

    #[test]
    fn test_missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalStore::new(JsonFileKv::new(dir.path().join("absent.json")));
        assert!(store.get().unwrap().is_none());
    }
}
