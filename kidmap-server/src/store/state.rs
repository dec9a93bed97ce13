//! The persisted navigation snapshot.
//!
//! The whole snapshot is stored as one JSON value under a single key. It is
//! always written in full and read once at startup. A snapshot written with a
//! different schema version is ignored entirely; there is no migration.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{Place, PlaceId, RouteOptions, TravelMode};

use super::storage::{KeyValueStorage, StorageError};

/// Current snapshot schema version.
pub const SCHEMA_VERSION: u32 = 1;

/// Storage key of the snapshot.
pub const STORAGE_KEY: &str = "kidmap-navigation-state";

/// Display preferences for children who need them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AccessibilitySettings {
    pub large_text: bool,
    pub high_contrast: bool,
    pub voice_descriptions: bool,
    pub simplified_mode: bool,
}

/// A photo taken on arrival to show a parent the child got there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoCheckIn {
    pub id: String,
    pub place_id: PlaceId,
    pub place_name: String,
    pub photo_url: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Everything about navigation that survives a restart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedState {
    pub version: u32,
    pub favorites: Vec<Place>,
    pub recent_searches: Vec<Place>,
    pub accessibility_settings: AccessibilitySettings,
    pub photo_check_ins: Vec<PhotoCheckIn>,
    pub selected_travel_mode: TravelMode,
    pub route_options: RouteOptions,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            version: SCHEMA_VERSION,
            favorites: Vec::new(),
            recent_searches: Vec::new(),
            accessibility_settings: AccessibilitySettings::default(),
            photo_check_ins: Vec::new(),
            selected_travel_mode: TravelMode::default(),
            route_options: RouteOptions::default(),
        }
    }
}

/// Just enough of a snapshot to check its version before decoding the rest.
#[derive(Deserialize)]
struct VersionHeader {
    version: u32,
}

/// Serialize `state` and store it under [`STORAGE_KEY`].
pub async fn save_persisted_state(
    storage: &dyn KeyValueStorage,
    state: &PersistedState,
) -> Result<(), StorageError> {
    let json = serde_json::to_string(state)?;
    storage.set(STORAGE_KEY, json).await
}

/// Load the stored snapshot.
///
/// Returns `None` if nothing is stored, the stored version is not
/// [`SCHEMA_VERSION`], or the value cannot be read or decoded.
pub async fn load_persisted_state(storage: &dyn KeyValueStorage) -> Option<PersistedState> {
    let raw = match storage.get(STORAGE_KEY).await {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            warn!(error = %e, "failed to read persisted navigation state");
            return None;
        }
    };

    let header: VersionHeader = match serde_json::from_str(&raw) {
        Ok(header) => header,
        Err(e) => {
            warn!(error = %e, "persisted navigation state is not valid");
            return None;
        }
    };

    if header.version != SCHEMA_VERSION {
        info!(
            stored = header.version,
            current = SCHEMA_VERSION,
            "discarding persisted navigation state from another schema version"
        );
        return None;
    }

    match serde_json::from_str(&raw) {
        Ok(state) => Some(state),
        Err(e) => {
            warn!(error = %e, "persisted navigation state is corrupt");
            None
        }
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::{Coordinates, PlaceCategory};
    use crate::store::storage::MemoryStorage;
    use proptest::prelude::*;

    fn place_strategy() -> impl Strategy<Value = Place> {
        // Millidegree coordinates, which survive a JSON round trip exactly
        ("[a-z0-9]{1,6}", "[A-Za-z ]{0,12}", -80_000i32..80_000, -179_000i32..179_000).prop_map(
            |(id, name, lat, lon)| {
                Place::new(
                    PlaceId::new(id).unwrap(),
                    name,
                    "",
                    PlaceCategory::Friend,
                    Coordinates::new(f64::from(lat) / 1000.0, f64::from(lon) / 1000.0),
                )
            },
        )
    }

    fn state_strategy() -> impl Strategy<Value = PersistedState> {
        (
            proptest::collection::vec(place_strategy(), 0..5),
            proptest::collection::vec(place_strategy(), 0..5),
            any::<[bool; 4]>(),
            0usize..4,
            any::<[bool; 3]>(),
        )
            .prop_map(|(favorites, recent_searches, a, mode, o)| PersistedState {
                version: SCHEMA_VERSION,
                favorites,
                recent_searches,
                accessibility_settings: AccessibilitySettings {
                    large_text: a[0],
                    high_contrast: a[1],
                    voice_descriptions: a[2],
                    simplified_mode: a[3],
                },
                photo_check_ins: Vec::new(),
                selected_travel_mode: TravelMode::ALL[mode],
                route_options: RouteOptions {
                    avoid_highways: o[0],
                    avoid_tolls: o[1],
                    accessibility_mode: o[2],
                },
            })
    }

    fn roundtrip(state: &PersistedState) -> Option<PersistedState> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        runtime.block_on(async {
            let storage = MemoryStorage::new();
            save_persisted_state(&storage, state).await.unwrap();
            load_persisted_state(&storage).await
        })
    }

    proptest! {
        /// Matching version: load returns exactly what was saved
        #[test]
        fn roundtrip_matches(state in state_strategy()) {
            prop_assert_eq!(roundtrip(&state), Some(state));
        }

        /// Any other version: load returns nothing
        #[test]
        fn other_versions_discarded(state in state_strategy(), version in any::<u32>()) {
            prop_assume!(version != SCHEMA_VERSION);
            let state = PersistedState { version, ..state };
            prop_assert_eq!(roundtrip(&state), None);
        }
    }
}
