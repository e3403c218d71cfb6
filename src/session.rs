//! Live tile settings for one scope
//!
//! The session owns the current revision, applies reorder/toggle/reset on
//! top of it and writes each revision through to the active store. Updates
//! are optimistic: subscribers see the new revision before the write
//! completes, and a failed write keeps it while emitting one
//! [`SaveEvent::NotSaved`]. Mutations take `&mut self`, so a new write can
//! never start before the previous one has finished.

use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{broadcast, watch};
use tracing::{info, warn};

use crate::settings::{reconcile, SettingsError, TileSettings};
use crate::store::{Scope, SettingsStore, StoreError};

const SAVE_EVENT_CAPACITY: usize = 16;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Outcome of a write-through, one per mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveEvent {
    Saved { revision: u64 },
    NotSaved { revision: u64, reason: String },
}

pub struct TileSettingsSession<S> {
    store: S,
    scope: Scope,
    catalog_ids: Vec<String>,
    revision: u64,
    current: watch::Sender<Arc<TileSettings>>,
    events: broadcast::Sender<SaveEvent>,
}

impl<S: SettingsStore> TileSettingsSession<S> {
    /// Read and reconcile the stored value for `scope`
    ///
    /// `catalog_ids` are the tiles eligible for this session, in catalog order.
    pub async fn load(store: S, scope: Scope, catalog_ids: &[&str]) -> Result<Self, StoreError> {
        let stored = store.read(&scope).await?;
        let settings = reconcile(stored.as_ref(), catalog_ids);
        info!(scope = ?scope, stored = stored.is_some(), tiles = settings.order.len(), "Loaded tile settings");

        let (current, _) = watch::channel(Arc::new(settings));
        let (events, _) = broadcast::channel(SAVE_EVENT_CAPACITY);
        Ok(Self {
            store,
            scope,
            catalog_ids: catalog_ids.iter().map(|id| id.to_string()).collect(),
            revision: 0,
            current,
            events,
        })
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Latest revision, including optimistic ones
    pub fn current(&self) -> Arc<TileSettings> {
        Arc::clone(&self.current.borrow())
    }

    /// Receives every new revision
    pub fn subscribe(&self) -> watch::Receiver<Arc<TileSettings>> {
        self.current.subscribe()
    }

    /// Receives one [`SaveEvent`] per write
    pub fn save_events(&self) -> broadcast::Receiver<SaveEvent> {
        self.events.subscribe()
    }

    /// Persist a new order (from a committed drag)
    pub async fn reorder(&mut self, order: Vec<String>) -> Result<Arc<TileSettings>, SessionError> {
        let next = self.current().apply_order(order)?;
        self.commit(next).await
    }

    /// Persist a visibility change
    ///
    /// Every revision held here is already reconciled against the catalog, so
    /// an id missing from the order is not a catalog tile and is rejected.
    pub async fn toggle(&mut self, id: &str, visible: bool) -> Result<Arc<TileSettings>, SessionError> {
        let next = self.current().apply_visibility(id, visible).inspect_err(|err| {
            warn!(id, error = %err, "Toggle rejected");
        })?;
        self.commit(next).await
    }

    /// Persist the catalog defaults
    pub async fn reset(&mut self) -> Result<Arc<TileSettings>, SessionError> {
        let ids = self.catalog_id_refs();
        let next = TileSettings::default_for(&ids);
        self.commit(next).await
    }

    /// Re-read the store, e.g. after another consumer wrote to it
    pub async fn refresh(&mut self) -> Result<Arc<TileSettings>, StoreError> {
        let stored = self.store.read(&self.scope).await?;
        let ids = self.catalog_id_refs();
        let settings = Arc::new(reconcile(stored.as_ref(), &ids));
        self.current.send_replace(Arc::clone(&settings));
        Ok(settings)
    }

    fn catalog_id_refs(&self) -> Vec<&str> {
        self.catalog_ids.iter().map(String::as_str).collect()
    }

    async fn commit(&mut self, next: TileSettings) -> Result<Arc<TileSettings>, SessionError> {
        self.revision += 1;
        let revision = self.revision;
        let next = Arc::new(next);
        self.current.send_replace(Arc::clone(&next));

        match self.store.write(&self.scope, &next).await {
            Ok(()) => {
                let _ = self.events.send(SaveEvent::Saved { revision });
                Ok(next)
            }
            Err(err) => {
                warn!(revision, error = %err, "Tile settings not saved, keeping local changes");
                let _ = self.events.send(SaveEvent::NotSaved {
                    revision,
                    reason: err.to_string(),
                });
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::remote::FakePetsApi;
    use crate::store::{LocalStore, MemoryKv, PetRecord, PetsApi, RemoteStore, TransportError};
    use serde_json::{json, Value};
    use std::rc::Rc;
    use tokio::sync::Notify;

    const CATALOG: [&str; 4] = ["A", "B", "C", "D"];

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    async fn local_session() -> TileSettingsSession<LocalStore<MemoryKv>> {
        TileSettingsSession::load(LocalStore::new(MemoryKv::default()), Scope::Device, &CATALOG)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_load_defaults_when_nothing_stored() {
        let session = local_session().await;
        assert_eq!(session.current().order, ids(&CATALOG));
        assert_eq!(session.revision(), 0);
    }

    #[tokio::test]
    async fn test_reorder_writes_through_and_notifies() {
        let mut session = local_session().await;
        let mut watcher = session.subscribe();
        let mut events = session.save_events();

        session.reorder(ids(&["B", "A", "C", "D"])).await.unwrap();

        assert!(watcher.has_changed().unwrap());
        assert_eq!(watcher.borrow_and_update().order, ids(&["B", "A", "C", "D"]));
        assert_eq!(events.try_recv().unwrap(), SaveEvent::Saved { revision: 1 });
        assert_eq!(session.store().get().unwrap().unwrap().order, ids(&["B", "A", "C", "D"]));
    }

    #[tokio::test]
    async fn test_invalid_order_changes_nothing() {
        let mut session = local_session().await;
        let mut events = session.save_events();

        let err = session.reorder(ids(&["A", "B"])).await.unwrap_err();
        assert!(matches!(err, SessionError::Settings(SettingsError::InvalidOrder { .. })));
        assert_eq!(session.revision(), 0);
        assert!(events.try_recv().is_err());
        assert!(session.store().get().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_toggle_applies_on_top_of_reorder() {
        let mut session = local_session().await;
        session.reorder(ids(&["D", "C", "B", "A"])).await.unwrap();
        session.toggle("C", false).await.unwrap();

        let stored = session.store().get().unwrap().unwrap();
        assert_eq!(stored.order, ids(&["D", "C", "B", "A"]));
        assert!(!stored.is_visible("C"));
        assert_eq!(session.current().visible_ordered_ids(), vec!["D", "B", "A"]);
    }

    #[tokio::test]
    async fn test_toggle_unknown_tile_fails() {
        let mut session = local_session().await;
        let mut events = session.save_events();

        let err = session.toggle("Z", false).await.unwrap_err();
        assert!(matches!(err, SessionError::Settings(SettingsError::UnknownTile(_))));
        assert_eq!(session.revision(), 0);
        assert!(events.try_recv().is_err());
        assert!(session.store().get().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reset_restores_defaults() {
        let mut session = local_session().await;
        session.reorder(ids(&["D", "C", "B", "A"])).await.unwrap();
        session.toggle("A", false).await.unwrap();
        session.reset().await.unwrap();

        assert_eq!(*session.current(), TileSettings::default_for(&CATALOG));
    }

    #[tokio::test]
    async fn test_failed_remote_write_keeps_optimistic_order() {
        let api = FakePetsApi::with_pet("p1", json!({"order": ["A", "B", "C", "D"]}));
        api.fail_updates.set(true);
        let scope = Scope::Pet("p1".to_string());
        let mut session = TileSettingsSession::load(RemoteStore::new(api), scope, &CATALOG)
            .await
            .unwrap();
        let mut events = session.save_events();

        let err = session.reorder(ids(&["A", "C", "B", "D"])).await.unwrap_err();
        assert!(matches!(err, SessionError::Store(StoreError::Transport(_))));
        assert_eq!(session.current().order, ids(&["A", "C", "B", "D"]));

        assert!(matches!(events.try_recv().unwrap(), SaveEvent::NotSaved { revision: 1, .. }));
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_refresh_reads_store_again() {
        let api = FakePetsApi::with_pet("p1", json!({"order": ["B", "A"]}));
        let scope = Scope::Pet("p1".to_string());
        let mut session = TileSettingsSession::load(RemoteStore::new(api), scope, &CATALOG)
            .await
            .unwrap();
        assert_eq!(session.current().order, ids(&["B", "A", "C", "D"]));

        session
            .store()
            .api()
            .pets
            .borrow_mut()
            .insert("p1".to_string(), json!({"order": ["D"]}));
        session.store().invalidate("p1");

        let refreshed = session.refresh().await.unwrap();
        assert_eq!(refreshed.order, ids(&["D", "A", "B", "C"]));
    }

    /// Pet API whose updates wait for a go-ahead
    struct GatedApi {
        gate: Rc<Notify>,
    }

    impl PetsApi for GatedApi {
        async fn fetch_pet(&self, pet_id: &str) -> Result<PetRecord, TransportError> {
            Ok(PetRecord {
                id: pet_id.to_string(),
                name: String::new(),
                tiles_settings: Value::Null,
            })
        }

        async fn update_pet(&self, _pet_id: &str, _patch: Value) -> Result<(), TransportError> {
            self.gate.notified().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_subscribers_see_order_before_write_completes() {
        let gate = Rc::new(Notify::new());
        let api = GatedApi { gate: Rc::clone(&gate) };
        let scope = Scope::Pet("p1".to_string());
        let mut session = TileSettingsSession::load(RemoteStore::new(api), scope, &CATALOG)
            .await
            .unwrap();
        let watcher = session.subscribe();
        let mut events = session.save_events();

        let observer = async {
            tokio::task::yield_now().await;
            let seen = watcher.borrow().order.clone();
            let saved_early = events.try_recv().is_ok();
            gate.notify_one();
            (seen, saved_early)
        };
        let ((seen, saved_early), written) =
            tokio::join!(observer, session.reorder(ids(&["D", "A", "B", "C"])));

        assert_eq!(seen, ids(&["D", "A", "B", "C"]));
        assert!(!saved_early);
        assert!(written.is_ok());
        assert_eq!(events.try_recv().unwrap(), SaveEvent::Saved { revision: 1 });
    }
}
