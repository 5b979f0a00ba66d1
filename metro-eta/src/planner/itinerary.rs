//! Itinerary assembly: per-hop estimates folded into line segments.

use crate::domain::{ClockMinutes, LineName, StopId};
use crate::graph::EdgeKind;

/// Timing of one path edge.
#[derive(Debug, Clone, PartialEq)]
pub struct HopEstimate {
    pub from: StopId,
    pub to: StopId,
    pub line: LineName,
    pub kind: EdgeKind,
    /// Clock when the hop was evaluated.
    pub departure: ClockMinutes,
    /// Predicted (rail) or fixed (transfer) movement time.
    pub travel_minutes: f64,
    /// Boarding allowance charged to this hop.
    pub wait_minutes: f64,
}

impl HopEstimate {
    /// Contribution of this hop to the clock and to the total.
    pub fn total_minutes(&self) -> f64 {
        self.travel_minutes + self.wait_minutes
    }
}

/// A maximal run of consecutive hops on one line.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub line: LineName,
    /// Display name of the first stop.
    pub start: String,
    /// Display name of the last stop.
    pub end: String,
    pub duration_minutes: f64,
    /// Number of hops in the segment.
    pub stops: usize,
    /// The rider changes trains directly into the next segment.
    pub switch_alert: bool,
}

/// A planned journey.
#[derive(Debug, Clone, PartialEq)]
pub struct Itinerary {
    pub departure: ClockMinutes,
    pub total_minutes: f64,
    pub arrival: ClockMinutes,
    pub segments: Vec<Segment>,
    pub hops: Vec<HopEstimate>,
}

impl Itinerary {
    /// Fold hop estimates into an itinerary.
    ///
    /// `name_of` maps a stop id to the display name shown in segments.
    pub fn from_hops<F>(departure: ClockMinutes, hops: Vec<HopEstimate>, name_of: F) -> Self
    where
        F: Fn(&StopId) -> String,
    {
        let total_minutes: f64 = hops.iter().map(HopEstimate::total_minutes).sum();
        let segments = aggregate_segments(&hops, name_of);

        Self {
            departure,
            total_minutes,
            arrival: departure.advance(total_minutes),
            segments,
            hops,
        }
    }

    /// Number of path edges.
    pub fn hop_count(&self) -> usize {
        self.hops.len()
    }
}

/// Group hops into segments, splitting wherever the line label changes.
///
/// A boundary raises `switch_alert` on the closing segment only when both
/// sides are real lines. The last segment never carries an alert.
pub fn aggregate_segments<F>(hops: &[HopEstimate], name_of: F) -> Vec<Segment>
where
    F: Fn(&StopId) -> String,
{
    let mut segments: Vec<Segment> = Vec::new();
    let mut current: Option<Segment> = None;

    for hop in hops {
        if let Some(segment) = current.as_mut().filter(|segment| segment.line == hop.line) {
            segment.end = name_of(&hop.to);
            segment.duration_minutes += hop.total_minutes();
            segment.stops += 1;
            continue;
        }

        if let Some(mut closed) = current.take() {
            closed.switch_alert = !closed.line.is_transfer() && !hop.line.is_transfer();
            segments.push(closed);
        }
        current = Some(Segment {
            line: hop.line.clone(),
            start: name_of(&hop.from),
            end: name_of(&hop.to),
            duration_minutes: hop.total_minutes(),
            stops: 1,
            switch_alert: false,
        });
    }

    segments.extend(current);
    segments
}
