//! Prefetching of alternate travel modes.
//!
//! While a route is on screen in one travel mode, the other modes are
//! fetched in the background so that switching modes is instant.

use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::{Place, RouteOptions, TravelMode};
use crate::routing::RouteService;

use super::cache::RouteCacheClient;
use super::client::route_fetch;
use super::key::RouteQueryKey;

/// What happened to each prefetched mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefetchReport {
    /// Modes whose fetch was issued and succeeded.
    pub fetched: Vec<TravelMode>,
    /// Modes already fresh in the cache.
    pub skipped: Vec<TravelMode>,
    /// Modes whose fetch failed.
    pub failed: Vec<TravelMode>,
}

impl PrefetchReport {
    /// Number of modes a prefetch was issued for.
    pub fn issued(&self) -> usize {
        self.fetched.len() + self.failed.len()
    }
}

enum Outcome {
    Fetched,
    Skipped,
    Failed,
}

/// Prefetch every travel mode except `excluded_mode` in a background task.
///
/// Fire-and-forget: the caller is never blocked and never sees an error.
/// The handle may be awaited or dropped.
pub fn prefetch_route_variants(
    client: Arc<dyn RouteCacheClient>,
    service: RouteService,
    origin: Place,
    destination: Place,
    excluded_mode: TravelMode,
    options: RouteOptions,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let report = prefetch_variants(
            client.as_ref(),
            &service,
            &origin,
            &destination,
            excluded_mode,
            options,
        )
        .await;
        debug!(
            origin = %origin.id,
            destination = %destination.id,
            fetched = report.fetched.len(),
            skipped = report.skipped.len(),
            failed = report.failed.len(),
            "route prefetch finished"
        );
    })
}

/// Prefetch every travel mode except `excluded_mode` and report the outcome.
///
/// Each mode is attempted exactly once, concurrently. A mode with a fresh
/// cache entry is skipped. A failure in one mode does not affect the others.
pub async fn prefetch_variants(
    client: &dyn RouteCacheClient,
    service: &RouteService,
    origin: &Place,
    destination: &Place,
    excluded_mode: TravelMode,
    options: RouteOptions,
) -> PrefetchReport {
    let current = RouteQueryKey::new(origin, destination, excluded_mode, options);
    let attempts = TravelMode::ALL
        .into_iter()
        .filter(|mode| *mode != excluded_mode)
        .map(|mode| {
            let key = current.with_mode(mode);
            async move {
                if let Some(state) = client.query_state(&key).await
                    && state.is_fresh()
                {
                    return (mode, Outcome::Skipped);
                }

                let fetch = route_fetch(service, origin, destination, mode, options);
                match client.prefetch_query(key, fetch).await {
                    Ok(()) => (mode, Outcome::Fetched),
                    Err(e) => {
                        warn!(%mode, error = %e, "route prefetch failed");
                        (mode, Outcome::Failed)
                    }
                }
            }
        });

    let mut report = PrefetchReport::default();
    for (mode, outcome) in join_all(attempts).await {
        match outcome {
            Outcome::Fetched => report.fetched.push(mode),
            Outcome::Skipped => report.skipped.push(mode),
            Outcome::Failed => report.failed.push(mode),
        }
    }
    report
}
