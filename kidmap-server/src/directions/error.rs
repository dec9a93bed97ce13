//! Route fetch error types.

/// Errors from fetching routes.
///
/// The route service never retries; these surface to the query layer as-is.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// The directions provider could not be reached (connect, timeout, etc.)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The provider answered with an error status.
    #[error("provider error {status}: {message}")]
    Provider { status: u16, message: String },

    /// The provider answered with a body we could not decode.
    #[error("malformed provider response: {message}")]
    Malformed { message: String },

    /// The HTTP client could not be set up (bad API key, TLS backend).
    #[error("directions client setup failed: {0}")]
    Setup(String),

    /// The request cannot be answered (e.g. origin equals destination).
    #[error("invalid route request: {0}")]
    InvalidRequest(String),
}

impl RouteError {
    /// True when the failure came from the provider rather than the transport.
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            RouteError::Provider { .. } | RouteError::Malformed { .. }
        )
    }
}
