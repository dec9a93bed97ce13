//! Route query cache keys.

use std::fmt;

use crate::domain::{Place, PlaceId, RouteOptions, TravelMode};

/// Address of one cached route result: (origin, destination, mode, options).
///
/// Two queries with equal tuples share one cache entry and one in-flight
/// fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RouteQueryKey {
    pub origin: PlaceId,
    pub destination: PlaceId,
    pub mode: TravelMode,
    pub options: RouteOptions,
}

impl RouteQueryKey {
    pub fn new(
        origin: &Place,
        destination: &Place,
        mode: TravelMode,
        options: RouteOptions,
    ) -> Self {
        Self {
            origin: origin.id.clone(),
            destination: destination.id.clone(),
            mode,
            options,
        }
    }

    /// The same query in another travel mode.
    pub fn with_mode(&self, mode: TravelMode) -> Self {
        Self {
            mode,
            ..self.clone()
        }
    }
}

impl fmt::Display for RouteQueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flag = |on: bool, c: char| if on { c } else { '-' };
        write!(
            f,
            "routes/{}/{}/{}/{}{}{}",
            self.origin,
            self.destination,
            self.mode,
            flag(self.options.avoid_highways, 'h'),
            flag(self.options.avoid_tolls, 't'),
            flag(self.options.accessibility_mode, 'a'),
        )
    }
}
