//! In-memory route query cache.
//!
//! Entries are addressed by [`RouteQueryKey`]. Concurrent fetches of one key
//! share a single in-flight future, so a burst of identical requests makes
//! one provider call. An entry is *fresh* for `stale_time` after it was
//! fetched; a stale entry is still served to prefetch checks as "present but
//! stale" and is refetched by the next query. Entries are dropped entirely
//! after `gc_time`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::BoxFuture;
use moka::future::Cache as MokaCache;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::directions::RouteError;
use crate::domain::Route;

use super::key::RouteQueryKey;

/// A pending route fetch, executed by the cache only if it needs the data.
pub type RouteFetch = BoxFuture<'static, Result<Vec<Route>, RouteError>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// How long a fetched result counts as fresh.
    pub stale_time: Duration,

    /// How long an entry is kept at all (moka TTL).
    pub gc_time: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl CacheConfig {
    /// Set the freshness window.
    pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = stale_time;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(2 * 60),
            gc_time: Duration::from_secs(10 * 60),
            max_capacity: 500,
        }
    }
}

#[derive(Clone)]
struct CachedRoutes {
    routes: Arc<Vec<Route>>,
    fetched_at: Instant,
}

/// Snapshot of one cache entry.
#[derive(Debug, Clone)]
pub struct QueryState {
    pub data: Arc<Vec<Route>>,
    pub updated_at: Instant,
    pub is_stale: bool,
}

impl QueryState {
    pub fn is_fresh(&self) -> bool {
        !self.is_stale
    }
}

/// The surface the prefetch orchestrator needs from a query cache.
#[async_trait]
pub trait RouteCacheClient: Send + Sync {
    /// Current state of the entry at `key`, if any.
    async fn query_state(&self, key: &RouteQueryKey) -> Option<QueryState>;

    /// Run `fetch` and store its result under `key`, unless a fresh entry
    /// already exists.
    async fn prefetch_query(
        &self,
        key: RouteQueryKey,
        fetch: RouteFetch,
    ) -> Result<(), Arc<RouteError>>;
}

/// Route query cache.
pub struct RouteCache {
    entries: MokaCache<RouteQueryKey, CachedRoutes>,
    stale_time: Duration,
}

impl RouteCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let entries = MokaCache::builder()
            .time_to_live(config.gc_time)
            .max_capacity(config.max_capacity)
            .build();

        Self {
            entries,
            stale_time: config.stale_time,
        }
    }

    /// Get the state of a cached entry.
    pub async fn get_query_state(&self, key: &RouteQueryKey) -> Option<QueryState> {
        let cached = self.entries.get(key).await?;
        Some(QueryState {
            is_stale: cached.fetched_at.elapsed() >= self.stale_time,
            data: cached.routes,
            updated_at: cached.fetched_at,
        })
    }

    /// Return cached routes for `key`, running `fetch` if there is no fresh
    /// entry.
    ///
    /// Callers racing on the same key share one execution of `fetch`.
    /// Failures are not cached; a failed refresh keeps the stale entry.
    pub async fn fetch_query(
        &self,
        key: RouteQueryKey,
        fetch: RouteFetch,
    ) -> Result<Arc<Vec<Route>>, Arc<RouteError>> {
        let stale = match self.get_query_state(&key).await {
            Some(state) if state.is_fresh() => {
                trace!(%key, age = ?state.updated_at.elapsed(), "route cache hit");
                return Ok(state.data);
            }
            Some(stale) => {
                // Another caller may have refreshed it since the first read
                if let Some(current) = self.get_query_state(&key).await
                    && current.is_fresh()
                {
                    return Ok(current.data);
                }
                debug!(%key, "route cache entry stale, refetching");
                self.entries.invalidate(&key).await;
                Some(stale)
            }
            None => {
                debug!(%key, "route cache miss");
                None
            }
        };

        let result = self
            .entries
            .try_get_with(key.clone(), async move {
                fetch.await.map(|routes| CachedRoutes {
                    routes: Arc::new(routes),
                    fetched_at: Instant::now(),
                })
            })
            .await;

        match result {
            Ok(entry) => {
                debug!(entries = self.entry_count(), "route cache filled");
                Ok(entry.routes)
            }
            Err(e) => {
                if let Some(stale) = stale {
                    self.entries
                        .entry(key)
                        .or_insert(CachedRoutes {
                            routes: stale.data,
                            fetched_at: stale.updated_at,
                        })
                        .await;
                }
                Err(e)
            }
        }
    }

    /// Drop the entry at `key`.
    pub async fn invalidate(&self, key: &RouteQueryKey) {
        self.entries.invalidate(key).await;
    }

    /// Drop every entry.
    pub fn invalidate_all(&self) {
        self.entries.invalidate_all();
    }

    /// Approximate number of entries.
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}

#[async_trait]
impl RouteCacheClient for RouteCache {
    async fn query_state(&self, key: &RouteQueryKey) -> Option<QueryState> {
        self.get_query_state(key).await
    }

    async fn prefetch_query(
        &self,
        key: RouteQueryKey,
        fetch: RouteFetch,
    ) -> Result<(), Arc<RouteError>> {
        self.fetch_query(key, fetch).await.map(|_| ())
    }
}
