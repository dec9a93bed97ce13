//! Directions providers.
//!
//! A provider turns an origin/destination pair into baseline public
//! transport routes. The route service derives every travel mode's
//! variant from that baseline.

mod client;
mod error;
mod mock;
mod provider;

pub use client::{DirectionsConfig, HttpDirectionsProvider};
pub use error::RouteError;
pub use mock::MockDirectionsProvider;
pub use provider::DirectionsProvider;
