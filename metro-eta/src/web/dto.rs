//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::planner::{Itinerary, Segment};

/// Departure used when a request does not name one.
pub const DEFAULT_DEPARTURE: &str = "09:00";

/// Request to estimate a journey.
#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    /// Origin station name (any case)
    pub start: String,

    /// Destination station name (any case)
    pub end: String,

    /// Departure in HH:MM format (defaults to 09:00)
    #[serde(default = "default_departure")]
    pub time: String,
}

fn default_departure() -> String {
    DEFAULT_DEPARTURE.to_string()
}

/// Estimated journey.
#[derive(Debug, Serialize)]
pub struct PredictResponse {
    /// Total minutes including waits and transfers
    pub total_time: f64,

    /// Arrival clock, HH:MM
    pub arrival_time: String,

    pub segments: Vec<SegmentResult>,
}

/// One line segment of a journey.
#[derive(Debug, Serialize)]
pub struct SegmentResult {
    /// Line name, or "Transfer" for an in-station walk
    pub line: String,

    /// First station name
    pub start: String,

    /// Last station name
    pub end: String,

    /// Minutes spent in the segment
    pub duration: f64,

    /// Number of hops
    pub stops: usize,

    /// Whether the rider changes trains directly after this segment
    pub switch_alert: bool,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Conversion implementations
// ============================================================================

impl PredictResponse {
    /// Create from a planned itinerary.
    pub fn from_itinerary(itinerary: &Itinerary) -> Self {
        Self {
            total_time: itinerary.total_minutes,
            arrival_time: itinerary.arrival.to_string(),
            segments: itinerary
                .segments
                .iter()
                .map(SegmentResult::from_segment)
                .collect(),
        }
    }
}

impl SegmentResult {
    /// Create from a planner segment.
    pub fn from_segment(segment: &Segment) -> Self {
        Self {
            line: segment.line.to_string(),
            start: segment.start.clone(),
            end: segment.end.clone(),
            duration: segment.duration_minutes,
            stops: segment.stops,
            switch_alert: segment.switch_alert,
        }
    }
}
