//! Places a child can travel between.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle distances.
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Error returned when constructing an invalid place identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid place id: {reason}")]
pub struct InvalidPlaceId {
    reason: &'static str,
}

/// Opaque identifier of a [`Place`].
///
/// Identifiers are assigned by the client and only need to be non-empty.
/// Two places with the same id are treated as the same place everywhere
/// (favorites, recent searches, cache keys).
///
/// # Examples
///
/// ```
/// use kidmap_server::domain::PlaceId;
///
/// let id = PlaceId::new("school-1").unwrap();
/// assert_eq!(id.as_str(), "school-1");
///
/// assert!(PlaceId::new("").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlaceId(String);

impl PlaceId {
    /// Create a place id. Fails on an empty or all-whitespace string.
    pub fn new(id: impl Into<String>) -> Result<Self, InvalidPlaceId> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(InvalidPlaceId {
                reason: "place id cannot be empty",
            });
        }
        Ok(PlaceId(id))
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlaceId {
    type Error = InvalidPlaceId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        PlaceId::new(value)
    }
}

impl From<PlaceId> for String {
    fn from(id: PlaceId) -> Self {
        id.0
    }
}

impl fmt::Debug for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlaceId({})", self.0)
    }
}

impl fmt::Display for PlaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What kind of place this is. Drives the icon shown in the app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PlaceCategory {
    Home,
    School,
    Park,
    Library,
    Store,
    Restaurant,
    Cafe,
    Bakery,
    IceCream,
    Friend,
    Family,
    Other,
}

/// WGS84 coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in kilometres (haversine).
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = (other.latitude - self.latitude).to_radians();
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// A named location. Replaced wholesale on edit, never mutated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    pub id: PlaceId,
    pub name: String,
    pub address: String,
    pub category: PlaceCategory,
    pub coordinates: Coordinates,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,
}

impl Place {
    /// Create a place that is not marked as a favorite.
    pub fn new(
        id: PlaceId,
        name: impl Into<String>,
        address: impl Into<String>,
        category: PlaceCategory,
        coordinates: Coordinates,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
            category,
            coordinates,
            is_favorite: None,
        }
    }

    /// Returns a copy of this place with the favorite flag set.
    pub fn as_favorite(&self) -> Place {
        Place {
            is_favorite: Some(true),
            ..self.clone()
        }
    }

    /// Distance between two places in kilometres.
    pub fn distance_km(&self, other: &Place) -> f64 {
        self.coordinates.distance_km(&other.coordinates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn place(id: &str, lat: f64, lon: f64) -> Place {
        Place::new(
            PlaceId::new(id).unwrap(),
            id,
            "1 Test Street",
            PlaceCategory::Park,
            Coordinates::new(lat, lon),
        )
    }

    #[test]
    fn reject_blank_ids() {
        assert!(PlaceId::new("").is_err());
        assert!(PlaceId::new("   ").is_err());
        assert!(PlaceId::new("home").is_ok());
    }

    #[test]
    fn distance_is_zero_for_same_point() {
        let a = place("a", 51.5, -0.12);
        assert!(a.distance_km(&a) < 1e-9);
    }

    #[test]
    fn distance_london_to_paris() {
        let london = place("london", 51.5074, -0.1278);
        let paris = place("paris", 48.8566, 2.3522);
        let d = london.distance_km(&paris);
        assert!((340.0..350.0).contains(&d), "got {d}");
    }

    #[test]
    fn json_shape_matches_client() {
        let p = place("park-1", 1.0, 2.0).as_favorite();
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["id"], "park-1");
        assert_eq!(json["category"], "park");
        assert_eq!(json["isFavorite"], true);
        assert_eq!(json["coordinates"]["latitude"], 1.0);

        let category: PlaceCategory = serde_json::from_str("\"iceCream\"").unwrap();
        assert_eq!(category, PlaceCategory::IceCream);
    }

    #[test]
    fn empty_id_is_rejected_on_deserialize() {
        let json = r#"{"id":"","name":"x","address":"y","category":"home",
            "coordinates":{"latitude":0.0,"longitude":0.0}}"#;
        assert!(serde_json::from_str::<Place>(json).is_err());
    }
}
