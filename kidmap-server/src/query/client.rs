//! Cache-addressed route queries.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinHandle;

use crate::directions::RouteError;
use crate::domain::{Place, Route, RouteOptions, TravelMode};
use crate::routing::RouteService;

use super::cache::{CacheConfig, RouteCache, RouteCacheClient, RouteFetch};
use super::key::RouteQueryKey;
use super::prefetch::prefetch_route_variants;

/// Where a route query ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryStatus {
    /// Origin or destination missing; nothing was fetched.
    Disabled,
    Success,
    Error,
}

/// Result of one route query.
#[derive(Debug, Clone)]
pub struct RouteQueryResult {
    /// The cache key, absent for disabled queries.
    pub key: Option<RouteQueryKey>,
    pub enabled: bool,
    pub status: QueryStatus,
    pub data: Arc<Vec<Route>>,
    pub error: Option<Arc<RouteError>>,
}

impl RouteQueryResult {
    fn disabled() -> Self {
        Self {
            key: None,
            enabled: false,
            status: QueryStatus::Disabled,
            data: Arc::new(Vec::new()),
            error: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == QueryStatus::Success
    }

    pub fn routes(&self) -> &[Route] {
        &self.data
    }
}

/// Route service behind a query cache.
///
/// Cheap to clone; clones share the cache.
#[derive(Clone)]
pub struct RouteQueryClient {
    cache: Arc<RouteCache>,
    service: RouteService,
}

impl RouteQueryClient {
    pub fn new(service: RouteService, config: &CacheConfig) -> Self {
        Self {
            cache: Arc::new(RouteCache::new(config)),
            service,
        }
    }

    pub fn cache(&self) -> &RouteCache {
        &self.cache
    }

    pub fn service(&self) -> &RouteService {
        &self.service
    }

    /// The cache as seen by the prefetch orchestrator.
    pub fn cache_client(&self) -> Arc<dyn RouteCacheClient> {
        self.cache.clone()
    }

    /// Query routes from `origin` to `destination`.
    ///
    /// When either place is absent the query is disabled: the route service
    /// is not called and the data is empty. Otherwise results are cached per
    /// (origin, destination, mode, options), and concurrent queries for the
    /// same key share one fetch. Errors are reported in the result; nothing
    /// is retried.
    pub async fn routes_query(
        &self,
        origin: Option<&Place>,
        destination: Option<&Place>,
        mode: TravelMode,
        options: RouteOptions,
    ) -> RouteQueryResult {
        let (Some(origin), Some(destination)) = (origin, destination) else {
            return RouteQueryResult::disabled();
        };

        let key = RouteQueryKey::new(origin, destination, mode, options);
        let fetch = route_fetch(&self.service, origin, destination, mode, options);

        match self.cache.fetch_query(key.clone(), fetch).await {
            Ok(data) => RouteQueryResult {
                key: Some(key),
                enabled: true,
                status: QueryStatus::Success,
                data,
                error: None,
            },
            Err(error) => RouteQueryResult {
                key: Some(key),
                enabled: true,
                status: QueryStatus::Error,
                data: Arc::new(Vec::new()),
                error: Some(error),
            },
        }
    }

    /// Warm the cache for every mode other than `current_mode`.
    ///
    /// Runs in the background; see [`prefetch_route_variants`].
    pub fn prefetch_variants(
        &self,
        origin: &Place,
        destination: &Place,
        current_mode: TravelMode,
        options: RouteOptions,
    ) -> JoinHandle<()> {
        prefetch_route_variants(
            self.cache_client(),
            self.service.clone(),
            origin.clone(),
            destination.clone(),
            current_mode,
            options,
        )
    }

    /// Drop the cached result at `key`, so the next query refetches.
    pub async fn invalidate(&self, key: &RouteQueryKey) {
        self.cache.invalidate(key).await;
    }

    /// Drop every cached result.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
    }
}

/// A deferred call to the route service, owned so the cache can run it.
pub(crate) fn route_fetch(
    service: &RouteService,
    origin: &Place,
    destination: &Place,
    mode: TravelMode,
    options: RouteOptions,
) -> RouteFetch {
    let service = service.clone();
    let origin = origin.clone();
    let destination = destination.clone();
    Box::pin(async move {
        service
            .fetch_routes(&origin, &destination, mode, &options)
            .await
    })
}
