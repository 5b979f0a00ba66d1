//! Route planning.
//!
//! Answers "how long from station A to station B if I leave at this time?".
//! The path is the fewest-hops route through the transit graph; every rail
//! hop on it is timed by the travel-time model while the clock advances,
//! and the hops are then grouped into per-line segments.

mod config;
mod itinerary;
mod search;
mod stations;

pub use config::PlannerConfig;
pub use itinerary::{HopEstimate, Itinerary, Segment, aggregate_segments};
pub use search::{PlanError, Planner};
pub use stations::StationIndex;
