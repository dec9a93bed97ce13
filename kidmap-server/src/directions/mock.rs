//! Mock directions provider for running without a directions service.
//!
//! Synthesises plausible public transport routes from the straight-line
//! distance between two places. Output is deterministic for a fixed
//! departure time.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{Place, Route, RouteOptions, StepKind, TransitStep};

use super::error::RouteError;
use super::provider::DirectionsProvider;

/// Minutes of bus riding per kilometre.
const BUS_MINS_PER_KM: f64 = 3.0;

/// Minutes of subway riding per kilometre.
const SUBWAY_MINS_PER_KM: f64 = 2.0;

/// Longest synthetic ride, so far-apart places still get a plausible route.
const MAX_RIDE_MINUTES: u32 = 4 * 60;

/// Mock provider that answers every request with two synthetic routes:
/// one by bus and one by subway.
#[derive(Debug, Clone, Default)]
pub struct MockDirectionsProvider {
    departure: Option<DateTime<Utc>>,
    latency: Option<Duration>,
    failure: Option<(u16, String)>,
    calls: Arc<AtomicUsize>,
}

impl MockDirectionsProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a fixed departure time instead of the current time.
    pub fn with_departure(mut self, departure: DateTime<Utc>) -> Self {
        self.departure = Some(departure);
        self
    }

    /// Delay every answer, to simulate a slow network.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Answer every request with a provider error.
    pub fn failing(mut self, status: u16, message: impl Into<String>) -> Self {
        self.failure = Some((status, message.into()));
        self
    }

    /// Number of requests served so far (shared between clones).
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn baseline(&self, origin: &Place, destination: &Place) -> Result<Vec<Route>, RouteError> {
        let departure = self.departure.unwrap_or_else(Utc::now);
        let km = origin.distance_km(destination);
        let prefix = format!("{}-{}", origin.id, destination.id);

        let bus_mins = ride_minutes(km, BUS_MINS_PER_KM, 5);
        let stops = ((km / 0.5).round() as u32).max(1);
        let bus = Route::from_steps(
            format!("{prefix}-bus"),
            vec![
                TransitStep::new("1", StepKind::Walk, &origin.name, "Bus stop", 5),
                TransitStep::new("2", StepKind::Bus, "Bus stop", "Bus stop", bus_mins)
                    .with_line("12", "#2E7D32")
                    .with_stops(stops),
                TransitStep::new("3", StepKind::Walk, "Bus stop", &destination.name, 4),
            ],
            departure,
        );

        let subway_mins = ride_minutes(km, SUBWAY_MINS_PER_KM, 4);
        let subway = Route::from_steps(
            format!("{prefix}-subway"),
            vec![
                TransitStep::new("1", StepKind::Walk, &origin.name, "Station", 7),
                TransitStep::new("2", StepKind::Subway, "Station", "Station", subway_mins)
                    .with_line("Green", "#00A651")
                    .with_stops((stops / 2).max(1)),
                TransitStep::new("3", StepKind::Walk, "Station", &destination.name, 3),
            ],
            departure,
        );

        match (bus, subway) {
            (Some(bus), Some(subway)) => Ok(vec![bus, subway]),
            _ => Err(RouteError::Malformed {
                message: format!("synthetic route {prefix} overflows"),
            }),
        }
    }
}

fn ride_minutes(km: f64, mins_per_km: f64, minimum: u32) -> u32 {
    ((km * mins_per_km).round() as u32).clamp(minimum, MAX_RIDE_MINUTES)
}

#[async_trait]
impl DirectionsProvider for MockDirectionsProvider {
    async fn directions(
        &self,
        origin: &Place,
        destination: &Place,
        _options: &RouteOptions,
    ) -> Result<Vec<Route>, RouteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if let Some((status, message)) = &self.failure {
            return Err(RouteError::Provider {
                status: *status,
                message: message.clone(),
            });
        }

        self.baseline(origin, destination)
    }
}
