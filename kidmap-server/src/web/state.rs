//! Application state for the web layer.

use crate::query::RouteQueryClient;
use crate::store::NavigationStore;

/// Shared application state.
///
/// Contains all the services needed to handle requests. Both members are
/// cheap to clone and share their internals.
#[derive(Clone)]
pub struct AppState {
    /// Cached route queries
    pub routes: RouteQueryClient,

    /// Favorites, recent searches and preferences
    pub store: NavigationStore,
}

impl AppState {
    /// Create a new app state.
    pub fn new(routes: RouteQueryClient, store: NavigationStore) -> Self {
        Self { routes, store }
    }
}
