//! Domain types for the KidMap route core.
//!
//! Places, routes and travel modes as the mobile client sees them. All
//! types serialize to the client's camelCase JSON shape.

mod place;
mod route;
mod travel_mode;

pub use place::{Coordinates, InvalidPlaceId, Place, PlaceCategory, PlaceId};
pub use route::{Route, StepKind, TransitStep};
pub use travel_mode::{InvalidTravelMode, RouteOptions, TravelMode};
