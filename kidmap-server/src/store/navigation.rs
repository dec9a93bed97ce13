//! The navigation store.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::{Place, PlaceId, RouteOptions, TravelMode};

use super::scheduler::{PersistConfig, PersistScheduler};
use super::state::{
    AccessibilitySettings, PersistedState, PhotoCheckIn, SCHEMA_VERSION, load_persisted_state,
    save_persisted_state,
};
use super::storage::{KeyValueStorage, StorageError};

/// Maximum number of recent searches kept.
pub const MAX_RECENT_SEARCHES: usize = 10;

/// Maximum number of photo check-ins kept.
pub const MAX_PHOTO_CHECK_INS: usize = 50;

/// In-memory navigation state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationState {
    pub favorites: Vec<Place>,
    pub recent_searches: Vec<Place>,
    pub accessibility_settings: AccessibilitySettings,
    pub photo_check_ins: Vec<PhotoCheckIn>,
    pub selected_travel_mode: TravelMode,
    pub route_options: RouteOptions,
}

impl NavigationState {
    fn to_persisted(&self) -> PersistedState {
        PersistedState {
            version: SCHEMA_VERSION,
            favorites: self.favorites.clone(),
            recent_searches: self.recent_searches.clone(),
            accessibility_settings: self.accessibility_settings,
            photo_check_ins: self.photo_check_ins.clone(),
            selected_travel_mode: self.selected_travel_mode,
            route_options: self.route_options,
        }
    }

    fn from_persisted(snapshot: PersistedState) -> Self {
        let mut photo_check_ins = snapshot.photo_check_ins;
        photo_check_ins.truncate(MAX_PHOTO_CHECK_INS);
        Self {
            favorites: snapshot.favorites,
            recent_searches: snapshot.recent_searches,
            accessibility_settings: snapshot.accessibility_settings,
            photo_check_ins,
            selected_travel_mode: snapshot.selected_travel_mode,
            route_options: snapshot.route_options,
        }
    }
}

/// Favorites, recent searches and preferences, persisted with debounced
/// writes.
///
/// The store is an explicit container handed to whoever needs it; clones
/// share the same state and writer. Its methods are the only way to change
/// the state, and every change schedules one persist of the whole snapshot.
#[derive(Clone)]
pub struct NavigationStore {
    state: Arc<RwLock<NavigationState>>,
    storage: Arc<dyn KeyValueStorage>,
    persist: PersistScheduler,
}

impl NavigationStore {
    /// Create a store with default state. Must be called inside a tokio
    /// runtime, since it spawns the persistence task.
    pub fn new(storage: Arc<dyn KeyValueStorage>, config: &PersistConfig) -> Self {
        let state = Arc::new(RwLock::new(NavigationState::default()));

        let persist = {
            let state = state.clone();
            let storage = storage.clone();
            PersistScheduler::spawn(config.debounce, move || {
                let state = state.clone();
                let storage = storage.clone();
                async move {
                    let snapshot = state.read().await.to_persisted();
                    save_persisted_state(storage.as_ref(), &snapshot).await?;
                    debug!(favorites = snapshot.favorites.len(), "persisted navigation state");
                    Ok::<(), StorageError>(())
                }
            })
        };

        Self {
            state,
            storage,
            persist,
        }
    }

    /// Load the persisted snapshot into memory.
    ///
    /// Returns `true` if a snapshot was applied. A missing, unreadable or
    /// version-mismatched snapshot leaves the current state untouched.
    pub async fn hydrate(&self) -> bool {
        let Some(snapshot) = load_persisted_state(self.storage.as_ref()).await else {
            debug!("no persisted navigation state, keeping defaults");
            return false;
        };

        let mut state = self.state.write().await;
        *state = NavigationState::from_persisted(snapshot);
        info!(
            favorites = state.favorites.len(),
            recent = state.recent_searches.len(),
            "hydrated navigation state"
        );
        true
    }

    /// A copy of the current state.
    pub async fn snapshot(&self) -> NavigationState {
        self.state.read().await.clone()
    }

    pub async fn favorites(&self) -> Vec<Place> {
        self.state.read().await.favorites.clone()
    }

    pub async fn is_favorite(&self, id: &PlaceId) -> bool {
        self.state
            .read()
            .await
            .favorites
            .iter()
            .any(|p| &p.id == id)
    }

    /// Add `place` to the favorites. Returns `false` if a favorite with the
    /// same id already exists, in which case nothing changes.
    pub async fn add_to_favorites(&self, place: Place) -> bool {
        {
            let mut state = self.state.write().await;
            if state.favorites.iter().any(|p| p.id == place.id) {
                return false;
            }
            state.favorites.push(place.as_favorite());
        }
        self.persist.schedule();
        true
    }

    /// Remove the favorite with `id`. Returns `false` if there was none.
    pub async fn remove_from_favorites(&self, id: &PlaceId) -> bool {
        {
            let mut state = self.state.write().await;
            let before = state.favorites.len();
            state.favorites.retain(|p| &p.id != id);
            if state.favorites.len() == before {
                return false;
            }
        }
        self.persist.schedule();
        true
    }

    pub async fn recent_searches(&self) -> Vec<Place> {
        self.state.read().await.recent_searches.clone()
    }

    /// Record a search. The place moves to the front; the list keeps at most
    /// [`MAX_RECENT_SEARCHES`] entries, newest first.
    pub async fn add_recent_search(&self, place: Place) {
        {
            let mut state = self.state.write().await;
            state.recent_searches.retain(|p| p.id != place.id);
            state.recent_searches.insert(0, place);
            state.recent_searches.truncate(MAX_RECENT_SEARCHES);
        }
        self.persist.schedule();
    }

    pub async fn clear_recent_searches(&self) {
        self.state.write().await.recent_searches.clear();
        self.persist.schedule();
    }

    pub async fn accessibility_settings(&self) -> AccessibilitySettings {
        self.state.read().await.accessibility_settings
    }

    pub async fn update_accessibility_settings(&self, settings: AccessibilitySettings) {
        self.state.write().await.accessibility_settings = settings;
        self.persist.schedule();
    }

    /// Record a photo check-in, keeping at most [`MAX_PHOTO_CHECK_INS`],
    /// newest first.
    pub async fn add_photo_check_in(&self, check_in: PhotoCheckIn) {
        {
            let mut state = self.state.write().await;
            state.photo_check_ins.insert(0, check_in);
            state.photo_check_ins.truncate(MAX_PHOTO_CHECK_INS);
        }
        self.persist.schedule();
    }

    pub async fn selected_travel_mode(&self) -> TravelMode {
        self.state.read().await.selected_travel_mode
    }

    pub async fn set_travel_mode(&self, mode: TravelMode) {
        self.state.write().await.selected_travel_mode = mode;
        self.persist.schedule();
    }

    pub async fn route_options(&self) -> RouteOptions {
        self.state.read().await.route_options
    }

    pub async fn set_route_options(&self, options: RouteOptions) {
        self.state.write().await.route_options = options;
        self.persist.schedule();
    }

    /// Write any pending change now.
    pub async fn flush(&self) {
        self.persist.flush().await;
    }

    /// Write any pending change and stop persisting. Call on teardown.
    pub async fn shutdown(&self) {
        self.persist.shutdown().await;
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{Coordinates, PlaceCategory};
    use crate::store::storage::MemoryStorage;
    use proptest::prelude::*;

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8),
        Remove(u8),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![(0u8..6).prop_map(Op::Add), (0u8..6).prop_map(Op::Remove)]
    }

    fn place(n: u8) -> Place {
        Place::new(
            PlaceId::new(format!("p{n}")).unwrap(),
            "",
            "",
            PlaceCategory::Other,
            Coordinates::new(0.0, 0.0),
        )
    }

    proptest! {
        /// Favorites never contain two entries with the same id, and match
        /// a simple set model after any sequence of adds and removes
        #[test]
        fn favorites_behave_like_a_set(ops in proptest::collection::vec(op_strategy(), 0..30)) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .build()
                .unwrap();
            let favorites = runtime.block_on(async {
                let store = NavigationStore::new(
                    Arc::new(MemoryStorage::new()),
                    &PersistConfig::default(),
                );
                let mut model = std::collections::BTreeSet::new();
                for op in &ops {
                    match op {
                        Op::Add(n) => {
                            let added = store.add_to_favorites(place(*n)).await;
                            assert_eq!(added, model.insert(*n));
                        }
                        Op::Remove(n) => {
                            let removed = store.remove_from_favorites(&place(*n).id).await;
                            assert_eq!(removed, model.remove(n));
                        }
                    }
                }
                let favorites = store.favorites().await;
                assert_eq!(favorites.len(), model.len());
                favorites
            });

            let mut ids: Vec<_> = favorites.iter().map(|p| p.id.clone()).collect();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), favorites.len());
        }
    }
}
