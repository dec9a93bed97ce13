//! HTTP directions provider client.
//!
//! Posts origin/destination pairs to a directions service and decodes the
//! baseline routes it returns.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{Place, Route, RouteOptions};

use super::error::RouteError;
use super::provider::DirectionsProvider;

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Default request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Configuration for the directions client.
#[derive(Debug, Clone)]
pub struct DirectionsConfig {
    /// Base URL of the directions service
    pub base_url: String,
    /// API key sent in the `x-apikey` header
    pub api_key: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl DirectionsConfig {
    /// Create a new config for the service at `base_url`.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

#[derive(Debug, Serialize)]
struct DirectionsRequest<'a> {
    origin: &'a Place,
    destination: &'a Place,
    options: &'a RouteOptions,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    routes: Vec<Route>,
}

/// Directions provider backed by an HTTP service.
///
/// Uses a semaphore to limit concurrent requests, so a burst of prefetches
/// cannot flood the provider.
#[derive(Debug, Clone)]
pub struct HttpDirectionsProvider {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl HttpDirectionsProvider {
    /// Create a new client with the given configuration.
    pub fn new(config: DirectionsConfig) -> Result<Self, RouteError> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| RouteError::Setup("invalid API key format".to_string()))?;
        headers.insert("x-apikey", api_key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RouteError::Setup(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    fn routes_url(&self) -> String {
        format!("{}/routes", self.base_url)
    }
}

#[async_trait]
impl DirectionsProvider for HttpDirectionsProvider {
    async fn directions(
        &self,
        origin: &Place,
        destination: &Place,
        options: &RouteOptions,
    ) -> Result<Vec<Route>, RouteError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| RouteError::Provider {
                status: 0,
                message: "request limiter closed".to_string(),
            })?;

        debug!(origin = %origin.id, destination = %destination.id, "requesting directions");

        let response = self
            .http
            .post(self.routes_url())
            .json(&DirectionsRequest {
                origin,
                destination,
                options,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RouteError::Provider {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let decoded: DirectionsResponse =
            serde_json::from_str(&body).map_err(|e| RouteError::Malformed {
                message: e.to_string(),
            })?;

        Ok(decoded.routes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = DirectionsConfig::new("https://directions.test", "key");
        assert_eq!(config.max_concurrent, DEFAULT_MAX_CONCURRENT);
        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn config_builders() {
        let config = DirectionsConfig::new("https://directions.test", "key")
            .with_max_concurrent(2)
            .with_timeout(5);
        assert_eq!(config.max_concurrent, 2);
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let client =
            HttpDirectionsProvider::new(DirectionsConfig::new("https://directions.test/", "key"))
                .unwrap();
        assert_eq!(client.routes_url(), "https://directions.test/routes");
    }

    #[test]
    fn invalid_api_key_rejected() {
        let result = HttpDirectionsProvider::new(DirectionsConfig::new(
            "https://directions.test",
            "bad\nkey",
        ));
        assert!(matches!(result, Err(RouteError::Setup(_))));
    }

    #[test]
    fn decode_response_body() {
        let body = r#"{"routes":[{"id":"r1","steps":[],"totalDuration":0,
            "departureTime":"2026-03-02T08:00:00Z","arrivalTime":"2026-03-02T08:00:00Z"}]}"#;
        let decoded: DirectionsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(decoded.routes.len(), 1);
        assert_eq!(decoded.routes[0].id, "r1");
    }
}
