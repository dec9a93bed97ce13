//! Persisted navigation state.
//!
//! The [`NavigationStore`] holds favorites, recent searches, accessibility
//! settings, photo check-ins and the selected travel mode. Every change
//! schedules a debounced write of the whole snapshot to key-value storage;
//! the snapshot is read back once at startup by [`NavigationStore::hydrate`].

mod navigation;
mod scheduler;
mod state;
mod storage;

pub use navigation::{MAX_PHOTO_CHECK_INS, MAX_RECENT_SEARCHES, NavigationState, NavigationStore};
pub use scheduler::{PersistConfig, PersistScheduler};
pub use state::{
    AccessibilitySettings, PersistedState, PhotoCheckIn, SCHEMA_VERSION, STORAGE_KEY,
    load_persisted_state, save_persisted_state,
};
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage, StorageError};
