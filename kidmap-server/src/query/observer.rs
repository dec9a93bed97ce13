//! A route query bound to one screen's changing parameters.

use std::sync::Mutex;

use tracing::debug;

use crate::domain::{Place, RouteOptions, TravelMode};

use super::client::{RouteQueryClient, RouteQueryResult};

/// Inputs of a route query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams {
    pub origin: Option<Place>,
    pub destination: Option<Place>,
    pub mode: TravelMode,
    pub options: RouteOptions,
}

/// Result of [`RouteQueryObserver::refetch`].
#[derive(Debug, Clone)]
pub enum QueryOutcome {
    /// The parameters were unchanged while fetching; this is the new result.
    Current(RouteQueryResult),
    /// The parameters changed while fetching; the result was dropped.
    Superseded,
}

struct ObserverState {
    generation: u64,
    params: QueryParams,
    latest: Option<RouteQueryResult>,
}

/// Follows the current parameters of a route query. Last request wins.
///
/// Changing the parameters does not abort an outstanding fetch: it runs to
/// completion and still populates the cache, but the observer no longer
/// depends on its result.
pub struct RouteQueryObserver {
    client: RouteQueryClient,
    state: Mutex<ObserverState>,
}

impl RouteQueryObserver {
    pub fn new(client: RouteQueryClient, params: QueryParams) -> Self {
        Self {
            client,
            state: Mutex::new(ObserverState {
                generation: 0,
                params,
                latest: None,
            }),
        }
    }

    /// Replace the parameters, superseding any fetch in flight.
    ///
    /// Returns the new generation.
    pub fn set_params(&self, params: QueryParams) -> u64 {
        let mut state = self.lock();
        if state.params == params {
            return state.generation;
        }
        state.generation += 1;
        state.params = params;
        state.latest = None;
        state.generation
    }

    /// Current parameters.
    pub fn params(&self) -> QueryParams {
        self.lock().params.clone()
    }

    /// Latest result for the current parameters, if one has arrived.
    pub fn latest(&self) -> Option<RouteQueryResult> {
        self.lock().latest.clone()
    }

    /// Run the query for the current parameters.
    pub async fn refetch(&self) -> QueryOutcome {
        let (generation, params) = {
            let state = self.lock();
            (state.generation, state.params.clone())
        };

        let result = self
            .client
            .routes_query(
                params.origin.as_ref(),
                params.destination.as_ref(),
                params.mode,
                params.options,
            )
            .await;

        let mut state = self.lock();
        if state.generation != generation {
            debug!(
                generation,
                current = state.generation,
                "discarding superseded route query result"
            );
            return QueryOutcome::Superseded;
        }
        state.latest = Some(result.clone());
        QueryOutcome::Current(result)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ObserverState> {
        // A poisoned lock only means another caller panicked mid-update;
        // the state itself is always whole.
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directions::MockDirectionsProvider;
    use crate::domain::{Coordinates, PlaceCategory, PlaceId};
    use crate::query::cache::CacheConfig;
    use crate::routing::RouteService;
    use std::sync::Arc;
    use std::time::Duration;

    fn place(id: &str, lat: f64) -> Place {
        Place::new(
            PlaceId::new(id).unwrap(),
            id,
            "",
            PlaceCategory::Other,
            Coordinates::new(lat, 0.0),
        )
    }

    fn params(mode: TravelMode) -> QueryParams {
        QueryParams {
            origin: Some(place("home", 0.0)),
            destination: Some(place("school", 0.02)),
            mode,
            options: RouteOptions::default(),
        }
    }

    fn client(provider: &MockDirectionsProvider) -> RouteQueryClient {
        RouteQueryClient::new(
            RouteService::with_provider(provider.clone()),
            &CacheConfig::default(),
        )
    }

    #[tokio::test]
    async fn refetch_stores_latest_result() {
        let provider = MockDirectionsProvider::new();
        let observer = RouteQueryObserver::new(client(&provider), params(TravelMode::Walking));

        let outcome = observer.refetch().await;

        assert!(matches!(outcome, QueryOutcome::Current(ref r) if r.is_success()));
        let latest = observer.latest().unwrap();
        assert!(latest.routes().iter().all(|r| r.id.starts_with("walk_")));
    }

    #[tokio::test]
    async fn unchanged_params_keep_generation() {
        let provider = MockDirectionsProvider::new();
        let observer = RouteQueryObserver::new(client(&provider), params(TravelMode::Walking));

        assert_eq!(observer.set_params(params(TravelMode::Walking)), 0);
        assert_eq!(observer.set_params(params(TravelMode::Biking)), 1);
        assert_eq!(observer.params().mode, TravelMode::Biking);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_fetch_is_discarded() {
        let provider = MockDirectionsProvider::new().with_latency(Duration::from_millis(500));
        let observer = Arc::new(RouteQueryObserver::new(
            client(&provider),
            params(TravelMode::Walking),
        ));

        let background = observer.clone();
        let handle = tokio::spawn(async move { background.refetch().await });

        // Let the fetch start before switching mode
        while provider.call_count() == 0 {
            tokio::task::yield_now().await;
        }
        observer.set_params(params(TravelMode::Driving));

        let outcome = handle.await.unwrap();
        assert!(matches!(outcome, QueryOutcome::Superseded));
        assert!(observer.latest().is_none());

        // The superseded fetch still completed and populated the cache
        assert_eq!(provider.call_count(), 1);

        let outcome = observer.refetch().await;
        match outcome {
            QueryOutcome::Current(result) => {
                assert!(result.routes().iter().all(|r| r.id.starts_with("drive_")))
            }
            QueryOutcome::Superseded => panic!("current fetch should not be superseded"),
        }
    }
}
