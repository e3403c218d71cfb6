//! Settings stores
//!
//! Two interchangeable backends behind one small interface:
//! - **local**: device-wide settings in a synchronous key-value store
//! - **remote**: per-pet settings kept as a field of the remote pet record
//!
//! [`ActiveStore`] picks one depending on whether a pet is selected.

pub mod local;
pub mod remote;

pub use local::{JsonFileKv, KeyValueStore, LocalStore, MemoryKv};
pub use remote::{PetRecord, PetsApi, RemoteStore, TransportError};

use std::future::Future;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::settings::TileSettings;

/// Persistence boundary of a settings value
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    /// One value for the whole device
    Device,
    /// One value per pet
    Pet(String),
}

impl Scope {
    /// Scope for the current pet selection
    pub fn from_selection(selected_pet: Option<&str>) -> Self {
        match selected_pet {
            Some(id) if !id.is_empty() => Scope::Pet(id.to_string()),
            _ => Scope::Device,
        }
    }

    pub fn pet_id(&self) -> Option<&str> {
        match self {
            Scope::Device => None,
            Scope::Pet(id) => Some(id),
        }
    }
}

/// Errors surfaced by stores
#[derive(Error, Debug)]
pub enum StoreError {
    /// A per-pet write was attempted without a selected pet
    #[error("No pet selected")]
    NoScopeSelected,

    /// The remote call failed
    #[error("Remote store error: {0}")]
    Transport(#[from] TransportError),

    /// Local file access failed
    #[error("Failed to access {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Settings could not be encoded
    #[error("Failed to encode tile settings: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Read/write capability shared by both backends
///
/// Reads return the raw stored value; callers reconcile it against the
/// catalog. `None` means nothing usable is stored.
pub trait SettingsStore {
    fn read(&self, scope: &Scope) -> impl Future<Output = Result<Option<TileSettings>, StoreError>>;

    fn write(&self, scope: &Scope, settings: &TileSettings) -> impl Future<Output = Result<(), StoreError>>;
}

/// Store chosen by pet selection
pub enum ActiveStore<K, A> {
    Local(LocalStore<K>),
    Remote(RemoteStore<A>),
}

impl<K: KeyValueStore, A: PetsApi> ActiveStore<K, A> {
    /// Remote when a pet is selected, local otherwise
    pub fn select(selected_pet: Option<&str>, local: LocalStore<K>, remote: RemoteStore<A>) -> (Self, Scope) {
        let scope = Scope::from_selection(selected_pet);
        let store = match scope {
            Scope::Device => ActiveStore::Local(local),
            Scope::Pet(_) => ActiveStore::Remote(remote),
        };
        (store, scope)
    }
}

impl<K: KeyValueStore, A: PetsApi> SettingsStore for ActiveStore<K, A> {
    async fn read(&self, scope: &Scope) -> Result<Option<TileSettings>, StoreError> {
        match self {
            ActiveStore::Local(store) => store.read(scope).await,
            ActiveStore::Remote(store) => store.read(scope).await,
        }
    }

    async fn write(&self, scope: &Scope, settings: &TileSettings) -> Result<(), StoreError> {
        match self {
            ActiveStore::Local(store) => store.write(scope, settings).await,
            ActiveStore::Remote(store) => store.write(scope, settings).await,
        }
    }
}
