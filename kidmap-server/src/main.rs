use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use kidmap_server::config::AppConfig;
use kidmap_server::directions::{HttpDirectionsProvider, MockDirectionsProvider};
use kidmap_server::query::RouteQueryClient;
use kidmap_server::routing::RouteService;
use kidmap_server::store::{FileStorage, NavigationStore};
use kidmap_server::web::{AppState, create_router};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // Route service, real or mock depending on credentials
    let service = match config.directions.clone() {
        Some(directions) => {
            info!(url = %directions.base_url, "using HTTP directions provider");
            RouteService::with_provider(HttpDirectionsProvider::new(directions)?)
        }
        None => {
            warn!("KIDMAP_DIRECTIONS_API_KEY not set, using mock directions");
            RouteService::with_provider(MockDirectionsProvider::new())
        }
    };
    let routes = RouteQueryClient::new(service, &config.cache);

    // Navigation store, restored from disk
    let storage = FileStorage::new(config.data_dir.clone());
    let store = NavigationStore::new(Arc::new(storage), &config.persist);
    if store.hydrate().await {
        info!(dir = %config.data_dir.display(), "restored navigation state");
    }

    let app = create_router(AppState::new(routes, store.clone()));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "KidMap server listening");

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    // Write any pending state even if serving failed
    store.shutdown().await;
    info!("navigation state flushed");

    served?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
