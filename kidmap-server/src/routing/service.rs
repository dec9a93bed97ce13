//! Route service: per-mode route candidates from a directions provider.

use std::sync::Arc;

use tracing::debug;

use crate::directions::{DirectionsProvider, RouteError};
use crate::domain::{Place, Route, RouteOptions, StepKind, TravelMode};

/// Produces candidate routes for a travel mode.
///
/// Cheap to clone; clones share the provider. No retries are performed
/// here, retry policy belongs to the caller.
#[derive(Clone)]
pub struct RouteService {
    provider: Arc<dyn DirectionsProvider>,
}

impl RouteService {
    pub fn new(provider: Arc<dyn DirectionsProvider>) -> Self {
        Self { provider }
    }

    /// Wrap a concrete provider.
    pub fn with_provider<P: DirectionsProvider + 'static>(provider: P) -> Self {
        Self::new(Arc::new(provider))
    }

    /// Fetch candidate routes from `origin` to `destination` in `mode`.
    ///
    /// Every returned route's id starts with the mode's prefix, and for the
    /// non-transit modes every step is travelled with the mode's locomotion.
    pub async fn fetch_routes(
        &self,
        origin: &Place,
        destination: &Place,
        mode: TravelMode,
        options: &RouteOptions,
    ) -> Result<Vec<Route>, RouteError> {
        if origin.id == destination.id {
            return Err(RouteError::InvalidRequest(
                "origin and destination are the same place".to_string(),
            ));
        }

        let baseline = self
            .provider
            .directions(origin, destination, options)
            .await?;

        let mut routes = baseline
            .into_iter()
            .map(|route| adapt_route(route, mode))
            .collect::<Result<Vec<_>, _>>()?;

        // Subway stations are the least likely to be step-free
        if options.accessibility_mode && mode == TravelMode::Transit {
            routes.sort_by_key(|r| r.uses(StepKind::Subway));
        }

        debug!(
            origin = %origin.id,
            destination = %destination.id,
            %mode,
            count = routes.len(),
            "fetched routes"
        );

        Ok(routes)
    }
}

/// Longest route accepted from a provider, in minutes (one week).
const MAX_ROUTE_MINUTES: u32 = 7 * 24 * 60;

/// How much longer (>1) or shorter (<1) a mode takes than the baseline.
fn duration_factor(mode: TravelMode) -> f64 {
    match mode {
        TravelMode::Transit => 1.0,
        TravelMode::Walking => 1.5,
        TravelMode::Biking => 0.8,
        TravelMode::Driving => 0.6,
    }
}

/// Scale a step duration, keeping non-empty steps at least a minute long.
fn scale_minutes(minutes: u32, factor: f64) -> u32 {
    if minutes == 0 {
        return 0;
    }
    ((f64::from(minutes) * factor).round() as u32).max(1)
}

/// Turn a baseline route into the variant for `mode`.
///
/// Fails with [`RouteError::Malformed`] if the adapted route would be longer
/// than [`MAX_ROUTE_MINUTES`].
fn adapt_route(route: Route, mode: TravelMode) -> Result<Route, RouteError> {
    let factor = duration_factor(mode);
    let locomotion = mode.locomotion();
    let id = format!("{}{}", mode.id_prefix(), route.id);

    let steps = route
        .steps
        .into_iter()
        .map(|mut step| {
            step.duration = scale_minutes(step.duration, factor);
            if let Some(kind) = locomotion {
                step.kind = kind;
                step.line = None;
                step.color = None;
                step.stops = None;
            }
            step
        })
        .collect();

    Route::from_steps(id.clone(), steps, route.departure_time)
        .filter(|adapted| adapted.total_duration <= MAX_ROUTE_MINUTES)
        .ok_or_else(|| RouteError::Malformed {
            message: format!("route {id} is longer than {MAX_ROUTE_MINUTES} minutes"),
        })
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::directions::MockDirectionsProvider;
    use crate::domain::{Coordinates, PlaceCategory, PlaceId};
    use proptest::prelude::*;

    fn place_strategy() -> impl Strategy<Value = Place> {
        ("[a-z]{1,8}", -60.0f64..60.0, -170.0f64..170.0).prop_map(|(id, lat, lon)| {
            Place::new(
                PlaceId::new(id.clone()).unwrap(),
                id,
                "",
                PlaceCategory::Other,
                Coordinates::new(lat, lon),
            )
        })
    }

    fn fetch(origin: &Place, destination: &Place, mode: TravelMode) -> Vec<Route> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let svc = RouteService::with_provider(MockDirectionsProvider::new());
        runtime
            .block_on(svc.fetch_routes(origin, destination, mode, &RouteOptions::default()))
            .unwrap()
    }

    proptest! {
        /// Walking routes are walk-prefixed and start with a walk step
        #[test]
        fn walking_prefix_and_kind(origin in place_strategy(), destination in place_strategy()) {
            prop_assume!(origin.id != destination.id);
            let routes = fetch(&origin, &destination, TravelMode::Walking);
            prop_assert!(!routes.is_empty());
            for route in &routes {
                prop_assert!(route.id.starts_with("walk_"));
                prop_assert_eq!(route.steps.first().map(|s| s.kind), Some(StepKind::Walk));
            }
        }

        /// Driving routes are drive-prefixed and start with a car step
        #[test]
        fn driving_prefix_and_kind(origin in place_strategy(), destination in place_strategy()) {
            prop_assume!(origin.id != destination.id);
            let routes = fetch(&origin, &destination, TravelMode::Driving);
            prop_assert!(!routes.is_empty());
            for route in &routes {
                prop_assert!(route.id.starts_with("drive_"));
                prop_assert_eq!(route.steps.first().map(|s| s.kind), Some(StepKind::Car));
            }
        }

        /// Total duration always equals the sum of step durations
        #[test]
        fn totals_are_consistent(
            origin in place_strategy(),
            destination in place_strategy(),
            mode_idx in 0usize..4,
        ) {
            prop_assume!(origin.id != destination.id);
            let mode = TravelMode::ALL[mode_idx];
            for route in fetch(&origin, &destination, mode) {
                let sum: u32 = route.steps.iter().map(|s| s.duration).sum();
                prop_assert_eq!(route.total_duration, sum);
            }
        }
    }
}
