//! Timetable tables and their CSV loader.
//!
//! The estimator consumes four GTFS tables: stops, stop times, routes and
//! trips. They are read once at startup; rows that do not deserialize are
//! skipped, a missing file is fatal.

mod error;
mod records;

pub use error::TimetableError;
pub use records::{RouteRecord, StopRecord, StopTimeRecord, TripRecord};

use std::fs::File;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::domain::{Stop, StopId};

/// File names inside the data directory.
pub const STOPS_FILE: &str = "stops.txt";
pub const STOP_TIMES_FILE: &str = "stop_times.txt";
pub const ROUTES_FILE: &str = "routes.txt";
pub const TRIPS_FILE: &str = "trips.txt";

/// The four raw timetable tables.
#[derive(Debug, Clone, Default)]
pub struct Timetable {
    pub stops: Vec<StopRecord>,
    pub stop_times: Vec<StopTimeRecord>,
    pub routes: Vec<RouteRecord>,
    pub trips: Vec<TripRecord>,
}

impl Timetable {
    /// Build a timetable from in-memory rows.
    pub fn from_records(
        stops: Vec<StopRecord>,
        stop_times: Vec<StopTimeRecord>,
        routes: Vec<RouteRecord>,
        trips: Vec<TripRecord>,
    ) -> Self {
        Self {
            stops,
            stop_times,
            routes,
            trips,
        }
    }

    /// Load all four tables from a GTFS directory.
    pub fn load(dir: &Path) -> Result<Self, TimetableError> {
        let timetable = Self {
            stops: read_table(&dir.join(STOPS_FILE))?,
            stop_times: read_table(&dir.join(STOP_TIMES_FILE))?,
            routes: read_table(&dir.join(ROUTES_FILE))?,
            trips: read_table(&dir.join(TRIPS_FILE))?,
        };

        info!(
            dir = %dir.display(),
            stops = timetable.stops.len(),
            stop_times = timetable.stop_times.len(),
            routes = timetable.routes.len(),
            trips = timetable.trips.len(),
            "Loaded timetable"
        );

        Ok(timetable)
    }

    /// Check that the tables needed to build a network are present.
    pub fn validate(&self) -> Result<(), TimetableError> {
        if self.stops.is_empty() {
            return Err(TimetableError::Empty("stops"));
        }
        if self.stop_times.is_empty() {
            return Err(TimetableError::Empty("stop_times"));
        }
        Ok(())
    }

    /// Stops with a valid id, in file order.
    pub fn network_stops(&self) -> Vec<Stop> {
        self.stops
            .iter()
            .filter_map(|record| {
                let id = StopId::parse(&record.stop_id).ok()?;
                Some(Stop::new(
                    id,
                    record.stop_name.trim(),
                    record.stop_lat,
                    record.stop_lon,
                ))
            })
            .collect()
    }
}

/// Read every deserializable row of a CSV file with a header line.
fn read_table<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, TimetableError> {
    let file = File::open(path).map_err(|source| TimetableError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    reader.headers().map_err(|source| TimetableError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in reader.deserialize() {
        match result {
            Ok(row) => rows.push(row),
            Err(_) => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(
            file = %path.display(),
            skipped,
            "Skipped rows that could not be parsed"
        );
    }

    Ok(rows)
}
