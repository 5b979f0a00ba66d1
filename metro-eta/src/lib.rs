//! Metro travel-time estimator.
//!
//! Learns hop durations from a GTFS timetable and answers: "if I leave
//! station A at this time, when will I reach station B, and where do I
//! change lines?"

pub mod config;
pub mod context;
pub mod domain;
pub mod features;
pub mod graph;
pub mod model;
pub mod planner;
pub mod timetable;
pub mod web;
