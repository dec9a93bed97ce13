//! Routes and the steps they are made of.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How a single step of a route is travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Subway,
    Train,
    Bus,
    Walk,
    Bike,
    Car,
}

/// One leg of a [`Route`]. Durations are whole minutes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitStep {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub from: String,
    pub to: String,
    pub duration: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stops: Option<u32>,
}

impl TransitStep {
    /// Create a step with no line information or timings.
    pub fn new(
        id: impl Into<String>,
        kind: StepKind,
        from: impl Into<String>,
        to: impl Into<String>,
        duration: u32,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            line: None,
            color: None,
            from: from.into(),
            to: to.into(),
            duration,
            departure_time: None,
            arrival_time: None,
            stops: None,
        }
    }

    /// Attach a line name and colour.
    pub fn with_line(mut self, line: impl Into<String>, color: impl Into<String>) -> Self {
        self.line = Some(line.into());
        self.color = Some(color.into());
        self
    }

    /// Attach a stop count.
    pub fn with_stops(mut self, stops: u32) -> Self {
        self.stops = Some(stops);
        self
    }
}

/// A candidate route. Produced fresh per query and never mutated afterwards;
/// a re-fetch replaces the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    pub id: String,
    pub steps: Vec<TransitStep>,
    pub total_duration: u32,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: DateTime<Utc>,
}

impl Route {
    /// Build a route leaving at `departure`.
    ///
    /// Step timings are laid out back to back from `departure`, and the
    /// total duration and arrival time are derived from the steps. Returns
    /// `None` if the total duration or the arrival time overflows.
    pub fn from_steps(
        id: impl Into<String>,
        steps: Vec<TransitStep>,
        departure: DateTime<Utc>,
    ) -> Option<Self> {
        let mut cursor = departure;
        let mut total_duration: u32 = 0;
        let mut laid_out = Vec::with_capacity(steps.len());

        for mut step in steps {
            total_duration = total_duration.checked_add(step.duration)?;
            step.departure_time = Some(cursor);
            cursor = cursor.checked_add_signed(Duration::minutes(i64::from(step.duration)))?;
            step.arrival_time = Some(cursor);
            laid_out.push(step);
        }

        Some(Self {
            id: id.into(),
            steps: laid_out,
            total_duration,
            departure_time: departure,
            arrival_time: cursor,
        })
    }

    /// Whether any step is travelled with `kind`.
    pub fn uses(&self, kind: StepKind) -> bool {
        self.steps.iter().any(|s| s.kind == kind)
    }
}
