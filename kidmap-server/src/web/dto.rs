//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::domain::{Place, Route, RouteOptions, TravelMode};
use crate::query::{QueryStatus, RouteQueryResult};
use crate::store::AccessibilitySettings;

/// Request for routes between two places.
///
/// Either place may be missing while the child is still choosing; the
/// query is then disabled and returns no routes.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutesRequest {
    #[serde(default)]
    pub origin: Option<Place>,

    #[serde(default)]
    pub destination: Option<Place>,

    /// Travel mode (defaults to transit)
    #[serde(default)]
    pub mode: TravelMode,

    #[serde(default)]
    pub options: RouteOptions,
}

/// Routes found for a request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutesResponse {
    pub enabled: bool,
    pub status: QueryStatus,
    pub routes: Vec<Route>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<&RouteQueryResult> for RoutesResponse {
    fn from(result: &RouteQueryResult) -> Self {
        Self {
            enabled: result.enabled,
            status: result.status,
            routes: result.routes().to_vec(),
            error: result.error.as_ref().map(|e| e.to_string()),
        }
    }
}

/// Navigation preferences.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesResponse {
    pub selected_travel_mode: TravelMode,
    pub route_options: RouteOptions,
    pub accessibility_settings: AccessibilitySettings,
}

/// Partial update of navigation preferences. Absent fields are unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesUpdate {
    pub selected_travel_mode: Option<TravelMode>,
    pub route_options: Option<RouteOptions>,
    pub accessibility_settings: Option<AccessibilitySettings>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
