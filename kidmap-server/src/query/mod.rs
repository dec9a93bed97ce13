//! Route queries, caching and prefetch.
//!
//! A route query is addressed by (origin, destination, mode, options). The
//! [`RouteQueryClient`] serves results from a moka-backed cache, running the
//! route service only on a miss or a stale entry, and shares one in-flight
//! fetch between concurrent callers of the same key. The prefetch
//! orchestrator warms the cache for the modes the user is not looking at.

mod cache;
mod client;
mod key;
mod observer;
mod prefetch;

pub use cache::{CacheConfig, QueryState, RouteCache, RouteCacheClient, RouteFetch};
pub use client::{QueryStatus, RouteQueryClient, RouteQueryResult};
pub use key::RouteQueryKey;
pub use observer::{QueryOutcome, QueryParams, RouteQueryObserver};
pub use prefetch::{PrefetchReport, prefetch_route_variants, prefetch_variants};
