//! Per-pet settings kept on the remote pet record
//!
//! Tile settings are the `tiles_settings` field of a pet. Reads fetch the
//! pet record and cache the decoded field per pet; writes send a partial
//! update carrying only that field and drop the cached value afterwards.

use serde::Deserialize;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::{Scope, SettingsStore, StoreError};
use crate::constants::remote::TILES_SETTINGS_FIELD;
use crate::settings::{decode_stored, TileSettings};

/// Failure reported by the remote API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// Session is missing or expired
    #[error("Not authorized")]
    Unauthorized,

    /// Request never completed
    #[error("Network error: {0}")]
    Network(String),

    /// Server answered with an error status
    #[error("Server returned {code}: {message}")]
    Status { code: u16, message: String },
}

/// The part of a pet record this store cares about
#[derive(Debug, Clone, Deserialize)]
pub struct PetRecord {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tiles_settings: Value,
}

/// Remote pet resource, provided by the request layer
pub trait PetsApi {
    fn fetch_pet(&self, pet_id: &str) -> impl Future<Output = Result<PetRecord, TransportError>>;

    /// Partial update: only the fields present in `patch` change
    fn update_pet(&self, pet_id: &str, patch: Value) -> impl Future<Output = Result<(), TransportError>>;
}

/// Settings store scoped to the selected pet
pub struct RemoteStore<A> {
    api: A,
    cache: RefCell<HashMap<String, Option<TileSettings>>>,
}

impl<A: PetsApi> RemoteStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Drop the cached value so the next read goes to the remote
    pub fn invalidate(&self, pet_id: &str) {
        if self.cache.borrow_mut().remove(pet_id).is_some() {
            debug!(pet_id, "Invalidated cached tile settings");
        }
    }
}

impl<A: PetsApi> SettingsStore for RemoteStore<A> {
    async fn read(&self, scope: &Scope) -> Result<Option<TileSettings>, StoreError> {
        // No pet selected: callers fall back to the default settings
        let Some(pet_id) = scope.pet_id() else {
            return Ok(None);
        };

        if let Some(cached) = self.cache.borrow().get(pet_id) {
            return Ok(cached.clone());
        }

        let pet = self.api.fetch_pet(pet_id).await.inspect_err(|err| {
            warn!(pet_id, error = %err, "Failed to fetch pet for tile settings");
        })?;
        let settings = decode_stored(&pet.tiles_settings);
        debug!(pet_id, pet = %pet.name, stored = settings.is_some(), "Fetched pet tile settings");

        self.cache.borrow_mut().insert(pet_id.to_string(), settings.clone());
        Ok(settings)
    }

    async fn write(&self, scope: &Scope, settings: &TileSettings) -> Result<(), StoreError> {
        let Some(pet_id) = scope.pet_id() else {
            return Err(StoreError::NoScopeSelected);
        };

        let mut patch = Map::new();
        patch.insert(TILES_SETTINGS_FIELD.to_string(), serde_json::to_value(settings)?);

        self.api
            .update_pet(pet_id, Value::Object(patch))
            .await
            .inspect_err(|err| warn!(pet_id, error = %err, "Failed to update pet tile settings"))?;

        self.invalidate(pet_id);
        info!(pet_id, tiles = settings.order.len(), "Saved tile settings for pet");
        Ok(())
    }
}

/// In-memory pet API with call counters and failure injection
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FakePetsApi {
    pub pets: RefCell<HashMap<String, Value>>,
    pub fetches: std::cell::Cell<usize>,
    pub updates: RefCell<Vec<(String, Value)>>,
    pub fail_updates: std::cell::Cell<bool>,
    pub fail_fetches: std::cell::Cell<bool>,
}

#[cfg(test)]
impl FakePetsApi {
    pub fn with_pet(pet_id: &str, tiles_settings: Value) -> Self {
        let api = Self::default();
        api.pets.borrow_mut().insert(pet_id.to_string(), tiles_settings);
        api
    }
}

#[cfg(test)]
impl PetsApi for FakePetsApi {
    async fn fetch_pet(&self, pet_id: &str) -> Result<PetRecord, TransportError> {
        self.fetches.set(self.fetches.get() + 1);
        if self.fail_fetches.get() {
            return Err(TransportError::Unauthorized);
        }
        let tiles_settings = self
            .pets
            .borrow()
            .get(pet_id)
            .cloned()
            .ok_or_else(|| TransportError::Status {
                code: 404,
                message: "Pet not found".to_string(),
            })?;
        Ok(PetRecord {
            id: pet_id.to_string(),
            name: format!("pet {pet_id}"),
            tiles_settings,
        })
    }

    async fn update_pet(&self, pet_id: &str, patch: Value) -> Result<(), TransportError> {
        self.updates.borrow_mut().push((pet_id.to_string(), patch.clone()));
        if self.fail_updates.get() {
            return Err(TransportError::Network("connection reset".to_string()));
        }
        if let Some(field) = patch.get(TILES_SETTINGS_FIELD) {
            self.pets.borrow_mut().insert(pet_id.to_string(), field.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pet(id: &str) -> Scope {
        Scope::Pet(id.to_string())
    }

    #[tokio::test]
    async fn test_read_decodes_field_and_caches() {
        let store = RemoteStore::new(FakePetsApi::with_pet("p1", json!({"order": ["B", "A"]})));

        let first = store.read(&pet("p1")).await.unwrap().unwrap();
        let second = store.read(&pet("p1")).await.unwrap().unwrap();
        assert_eq!(first.order, vec!["B", "A"]);
        assert_eq!(first, second);
        assert_eq!(store.api().fetches.get(), 1);
    }

    #[tokio::test]
    async fn test_read_missing_field_is_none() {
        let store = RemoteStore::new(FakePetsApi::with_pet("p1", Value::Null));
        assert!(store.read(&pet("p1")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_read_without_pet_is_none() {
        let store = RemoteStore::new(FakePetsApi::default());
        assert!(store.read(&Scope::Device).await.unwrap().is_none());
        assert_eq!(store.api().fetches.get(), 0);
    }

    #[tokio::test]
    async fn test_read_propagates_transport_error() {
        let api = FakePetsApi::with_pet("p1", Value::Null);
        api.fail_fetches.set(true);
        let store = RemoteStore::new(api);

        let err = store.read(&pet("p1")).await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(TransportError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_write_without_pet_fails_before_network() {
        let store = RemoteStore::new(FakePetsApi::default());
        let err = store.write(&Scope::Device, &TileSettings::default()).await.unwrap_err();

        assert!(matches!(err, StoreError::NoScopeSelected));
        assert!(store.api().updates.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_write_sends_partial_update_and_invalidates() {
        let store = RemoteStore::new(FakePetsApi::with_pet("p1", json!({"order": ["A", "B"]})));
        store.read(&pet("p1")).await.unwrap();

        let next = TileSettings::default_for(&["B", "A"]);
        store.write(&pet("p1"), &next).await.unwrap();

        let updates = store.api().updates.borrow().clone();
        assert_eq!(updates.len(), 1);
        let patch = updates[0].1.as_object().unwrap();
        assert_eq!(patch.len(), 1);
        assert_eq!(patch[TILES_SETTINGS_FIELD]["order"], json!(["B", "A"]));

        let reread = store.read(&pet("p1")).await.unwrap().unwrap();
        assert_eq!(reread.order, vec!["B", "A"]);
        assert_eq!(store.api().fetches.get(), 2);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_cache() {
        let store = RemoteStore::new(FakePetsApi::with_pet("p1", json!({"order": ["A"]})));
        store.read(&pet("p1")).await.unwrap();
        store.api().fail_updates.set(true);

        let err = store.write(&pet("p1"), &TileSettings::default()).await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(TransportError::Network(_))));

        store.read(&pet("p1")).await.unwrap();
        assert_eq!(store.api().fetches.get(), 1);
    }

    #[test]
    fn test_pet_record_accepts_mongo_id() {
        let record: PetRecord = serde_json::from_value(json!({
            "_id": "abc",
            "name": "Murka",
            "tiles_settings": {"order": []}
        }))
        .unwrap();
        assert_eq!(record.id, "abc");
        assert!(record.tiles_settings.is_object());
    }
}
