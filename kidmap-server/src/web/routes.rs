//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use tracing::warn;

use crate::directions::RouteError;
use crate::domain::{Place, PlaceId};
use crate::store::PhotoCheckIn;

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/routes", post(plan_routes))
        .route("/favorites", get(list_favorites).post(add_favorite))
        .route("/favorites/:id", delete(remove_favorite))
        .route(
            "/recent-searches",
            get(list_recent_searches)
                .post(add_recent_search)
                .delete(clear_recent_searches),
        )
        .route("/preferences", get(get_preferences).put(update_preferences))
        .route("/check-ins", get(list_check_ins).post(add_check_in))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Query routes, then warm the cache for the other travel modes.
async fn plan_routes(State(state): State<AppState>, Json(req): Json<RoutesRequest>) -> Response {
    let result = state
        .routes
        .routes_query(
            req.origin.as_ref(),
            req.destination.as_ref(),
            req.mode,
            req.options,
        )
        .await;

    let status = match result.error.as_deref() {
        None => StatusCode::OK,
        Some(RouteError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
        Some(e) => {
            warn!(error = %e, "route query failed");
            StatusCode::BAD_GATEWAY
        }
    };

    if result.is_success()
        && let (Some(origin), Some(destination)) = (&req.origin, &req.destination)
    {
        // Detached; the handle is not awaited
        let _ = state
            .routes
            .prefetch_variants(origin, destination, req.mode, req.options);
    }

    (status, Json(RoutesResponse::from(&result))).into_response()
}

async fn list_favorites(State(state): State<AppState>) -> Json<Vec<Place>> {
    Json(state.store.favorites().await)
}

/// Add a favorite. `201 Created` if new, `200 OK` if already present.
async fn add_favorite(
    State(state): State<AppState>,
    Json(place): Json<Place>,
) -> (StatusCode, Json<Vec<Place>>) {
    let added = state.store.add_to_favorites(place).await;
    let status = if added {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    (status, Json(state.store.favorites().await))
}

async fn remove_favorite(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = PlaceId::new(id).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    if state.store.remove_from_favorites(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound {
            message: format!("no favorite with id {id}"),
        })
    }
}

async fn list_recent_searches(State(state): State<AppState>) -> Json<Vec<Place>> {
    Json(state.store.recent_searches().await)
}

async fn add_recent_search(
    State(state): State<AppState>,
    Json(place): Json<Place>,
) -> Json<Vec<Place>> {
    state.store.add_recent_search(place).await;
    Json(state.store.recent_searches().await)
}

async fn clear_recent_searches(State(state): State<AppState>) -> StatusCode {
    state.store.clear_recent_searches().await;
    StatusCode::NO_CONTENT
}

async fn list_check_ins(State(state): State<AppState>) -> Json<Vec<PhotoCheckIn>> {
    Json(state.store.snapshot().await.photo_check_ins)
}

async fn add_check_in(
    State(state): State<AppState>,
    Json(check_in): Json<PhotoCheckIn>,
) -> StatusCode {
    state.store.add_photo_check_in(check_in).await;
    StatusCode::CREATED
}

async fn get_preferences(State(state): State<AppState>) -> Json<PreferencesResponse> {
    Json(preferences(&state).await)
}

async fn update_preferences(
    State(state): State<AppState>,
    Json(update): Json<PreferencesUpdate>,
) -> Json<PreferencesResponse> {
    if let Some(mode) = update.selected_travel_mode {
        state.store.set_travel_mode(mode).await;
    }
    if let Some(options) = update.route_options {
        state.store.set_route_options(options).await;
    }
    if let Some(settings) = update.accessibility_settings {
        state.store.update_accessibility_settings(settings).await;
    }
    Json(preferences(&state).await)
}

async fn preferences(state: &AppState) -> PreferencesResponse {
    let snapshot = state.store.snapshot().await;
    PreferencesResponse {
        selected_travel_mode: snapshot.selected_travel_mode,
        route_options: snapshot.route_options,
        accessibility_settings: snapshot.accessibility_settings,
    }
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        warn!(%status, %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directions::MockDirectionsProvider;
    use crate::domain::{Coordinates, PlaceCategory, RouteOptions, TravelMode};
    use crate::query::{CacheConfig, QueryStatus, RouteQueryClient, RouteQueryKey};
    use crate::routing::RouteService;
    use crate::store::{MemoryStorage, NavigationStore, PersistConfig};
    use std::sync::Arc;

    fn place(id: &str, lat: f64) -> Place {
        Place::new(
            PlaceId::new(id).unwrap(),
            id,
            "",
            PlaceCategory::School,
            Coordinates::new(lat, 0.0),
        )
    }

    fn app_state(provider: &MockDirectionsProvider) -> AppState {
        AppState::new(
            RouteQueryClient::new(
                RouteService::with_provider(provider.clone()),
                &CacheConfig::default(),
            ),
            NavigationStore::new(Arc::new(MemoryStorage::new()), &PersistConfig::default()),
        )
    }

    #[tokio::test]
    async fn plan_routes_without_destination_is_disabled() {
        let provider = MockDirectionsProvider::new();
        let state = app_state(&provider);

        let response = plan_routes(
            State(state),
            Json(RoutesRequest {
                origin: Some(place("home", 0.0)),
                destination: None,
                mode: TravelMode::Walking,
                options: RouteOptions::default(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn plan_routes_prefetches_other_modes() {
        let provider = MockDirectionsProvider::new();
        let state = app_state(&provider);
        let home = place("home", 0.0);
        let school = place("school", 0.02);

        let response = plan_routes(
            State(state.clone()),
            Json(RoutesRequest {
                origin: Some(home.clone()),
                destination: Some(school.clone()),
                mode: TravelMode::Transit,
                options: RouteOptions::default(),
            }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);

        // Awaiting an explicit prefetch joins the background one in flight
        state
            .routes
            .prefetch_variants(&home, &school, TravelMode::Transit, RouteOptions::default())
            .await
            .unwrap();

        assert_eq!(provider.call_count(), 4);
        let key = RouteQueryKey::new(&home, &school, TravelMode::Driving, RouteOptions::default());
        assert!(state.routes.cache().get_query_state(&key).await.is_some());
    }

    #[tokio::test]
    async fn plan_routes_reports_provider_failure() {
        let provider = MockDirectionsProvider::new().failing(503, "down");
        let state = app_state(&provider);

        let response = plan_routes(
            State(state.clone()),
            Json(RoutesRequest {
                origin: Some(place("home", 0.0)),
                destination: Some(place("school", 0.02)),
                mode: TravelMode::Transit,
                options: RouteOptions::default(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        // No prefetch after a failed query
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn plan_routes_rejects_same_place() {
        let provider = MockDirectionsProvider::new();
        let state = app_state(&provider);

        let response = plan_routes(
            State(state),
            Json(RoutesRequest {
                origin: Some(place("home", 0.0)),
                destination: Some(place("home", 0.0)),
                mode: TravelMode::Transit,
                options: RouteOptions::default(),
            }),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn favorites_add_and_remove() {
        let state = app_state(&MockDirectionsProvider::new());

        let (status, Json(favorites)) =
            add_favorite(State(state.clone()), Json(place("park", 0.0))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(favorites.len(), 1);

        let (status, Json(favorites)) =
            add_favorite(State(state.clone()), Json(place("park", 0.0))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(favorites.len(), 1);

        let status = remove_favorite(State(state.clone()), Path("park".to_string()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);

        let err = remove_favorite(State(state), Path("park".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn preferences_partial_update() {
        let state = app_state(&MockDirectionsProvider::new());

        let Json(prefs) = update_preferences(
            State(state.clone()),
            Json(PreferencesUpdate {
                selected_travel_mode: Some(TravelMode::Biking),
                ..PreferencesUpdate::default()
            }),
        )
        .await;

        assert_eq!(prefs.selected_travel_mode, TravelMode::Biking);
        assert_eq!(prefs.route_options, RouteOptions::default());

        let Json(again) = get_preferences(State(state)).await;
        assert_eq!(again, prefs);
    }

    #[tokio::test]
    async fn check_ins_are_listed() {
        let state = app_state(&MockDirectionsProvider::new());
        let check_in: PhotoCheckIn = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "placeId": "park",
            "placeName": "Park",
            "photoUrl": "file:///c1.jpg",
            "timestamp": "2026-05-01T15:30:00Z"
        }))
        .unwrap();

        let status = add_check_in(State(state.clone()), Json(check_in.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let Json(listed) = list_check_ins(State(state)).await;
        assert_eq!(listed, vec![check_in]);
    }

    #[test]
    fn query_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(QueryStatus::Success).unwrap(),
            "success"
        );
    }
}
