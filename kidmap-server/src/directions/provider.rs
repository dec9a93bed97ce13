//! The directions provider boundary.

use async_trait::async_trait;

use crate::domain::{Place, Route, RouteOptions};

use super::error::RouteError;

/// Source of baseline routes between two places.
///
/// Providers answer for public transport; the route service derives the
/// walking, biking and driving variants from the same baseline. This
/// abstraction allows the route service to be tested with mock data.
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    /// Fetch baseline routes from `origin` to `destination`.
    async fn directions(
        &self,
        origin: &Place,
        destination: &Place,
        options: &RouteOptions,
    ) -> Result<Vec<Route>, RouteError>;
}
