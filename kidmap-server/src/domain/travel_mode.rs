//! Travel modes and the options that select a route variant.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::StepKind;

/// Error returned when parsing an unknown travel mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown travel mode: {0}")]
pub struct InvalidTravelMode(String);

/// How the child is getting there. Determines which route variant is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Transit,
    Walking,
    Biking,
    Driving,
}

impl TravelMode {
    /// Every travel mode, in display order.
    pub const ALL: [TravelMode; 4] = [
        TravelMode::Transit,
        TravelMode::Walking,
        TravelMode::Biking,
        TravelMode::Driving,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Transit => "transit",
            TravelMode::Walking => "walking",
            TravelMode::Biking => "biking",
            TravelMode::Driving => "driving",
        }
    }

    /// Prefix for the ids of routes computed in this mode.
    pub fn id_prefix(&self) -> &'static str {
        match self {
            TravelMode::Transit => "transit_",
            TravelMode::Walking => "walk_",
            TravelMode::Biking => "bike_",
            TravelMode::Driving => "drive_",
        }
    }

    /// The single step kind used for every step in this mode.
    ///
    /// `None` for transit, whose steps keep the provider's kinds.
    pub fn locomotion(&self) -> Option<StepKind> {
        match self {
            TravelMode::Transit => None,
            TravelMode::Walking => Some(StepKind::Walk),
            TravelMode::Biking => Some(StepKind::Bike),
            TravelMode::Driving => Some(StepKind::Car),
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = InvalidTravelMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TravelMode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == s)
            .ok_or_else(|| InvalidTravelMode(s.to_string()))
    }
}

/// Options that select a variant of a route. Part of the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RouteOptions {
    pub avoid_highways: bool,
    pub avoid_tolls: bool,
    pub accessibility_mode: bool,
}
