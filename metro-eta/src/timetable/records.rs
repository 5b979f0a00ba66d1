//! Row types for the four timetable files.
//!
//! Only the columns the estimator needs are declared; any other GTFS
//! columns in the files are ignored by the CSV reader.

use serde::Deserialize;

/// One row of `stops.txt`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StopRecord {
    pub stop_id: String,
    pub stop_name: String,
    /// Unparseable coordinates read as missing rather than dropping the stop.
    #[serde(deserialize_with = "csv::invalid_option")]
    pub stop_lat: Option<f64>,
    #[serde(deserialize_with = "csv::invalid_option")]
    pub stop_lon: Option<f64>,
}

/// One row of `stop_times.txt`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StopTimeRecord {
    pub trip_id: String,
    pub stop_id: String,
    /// "HH:MM:SS"
    pub arrival_time: String,
    /// "HH:MM:SS"
    pub departure_time: String,
    pub stop_sequence: u32,
}

/// One row of `routes.txt`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RouteRecord {
    pub route_id: String,
    pub route_long_name: Option<String>,
}

/// One row of `trips.txt`.
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct TripRecord {
    pub trip_id: String,
    pub route_id: String,
}

impl StopRecord {
    pub fn new(stop_id: &str, stop_name: &str, stop_lat: f64, stop_lon: f64) -> Self {
        Self {
            stop_id: stop_id.to_string(),
            stop_name: stop_name.to_string(),
            stop_lat: Some(stop_lat),
            stop_lon: Some(stop_lon),
        }
    }
}

impl StopTimeRecord {
    pub fn new(
        trip_id: &str,
        stop_id: &str,
        arrival: &str,
        departure: &str,
        sequence: u32,
    ) -> Self {
        Self {
            trip_id: trip_id.to_string(),
            stop_id: stop_id.to_string(),
            arrival_time: arrival.to_string(),
            departure_time: departure.to_string(),
            stop_sequence: sequence,
        }
    }
}

impl RouteRecord {
    pub fn new(route_id: &str, route_long_name: Option<&str>) -> Self {
        Self {
            route_id: route_id.to_string(),
            route_long_name: route_long_name.map(str::to_string),
        }
    }
}

impl TripRecord {
    pub fn new(trip_id: &str, route_id: &str) -> Self {
        Self {
            trip_id: trip_id.to_string(),
            route_id: route_id.to_string(),
        }
    }
}
