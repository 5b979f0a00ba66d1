//! The initialised estimator: trained model, transit graph and station index.
//!
//! Built once from a timetable and never mutated afterwards, so a single
//! instance behind an `Arc` serves every request without locking.

use tracing::info;

use crate::domain::ClockMinutes;
use crate::features::build_hops;
use crate::graph::TransitGraph;
use crate::model::{BoostConfig, Model, ModelError};
use crate::planner::{Itinerary, PlanError, Planner, PlannerConfig, StationIndex};
use crate::timetable::{Timetable, TimetableError};

/// Errors that prevent the estimator from starting.
#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error(transparent)]
    Timetable(#[from] TimetableError),

    #[error("failed to train travel-time model: {0}")]
    Model(#[from] ModelError),
}

/// Everything a request needs, frozen after initialisation.
#[derive(Debug)]
pub struct EtaContext {
    model: Model,
    graph: TransitGraph,
    stations: StationIndex,
    config: PlannerConfig,
}

impl EtaContext {
    /// Derive hops, train the model and build the graph.
    ///
    /// This is CPU-heavy; call it off the async runtime.
    pub fn initialize(
        timetable: &Timetable,
        boost: &BoostConfig,
        config: PlannerConfig,
    ) -> Result<Self, InitError> {
        timetable.validate()?;

        let hops = build_hops(timetable);
        info!(
            hops = hops.len(),
            candidates = hops.stats.candidates,
            "Built training set"
        );

        let model = Model::train(&hops.feature_rows(), &hops.labels(), boost)?;
        let graph = TransitGraph::build(&timetable.network_stops(), &hops);
        let stations = StationIndex::from_graph(&graph);

        info!(
            stations = stations.len(),
            trees = model.num_trees(),
            "Estimator ready"
        );

        Ok(Self {
            model,
            graph,
            stations,
            config,
        })
    }

    /// Sorted, deduplicated station names.
    pub fn list_stations(&self) -> &[String] {
        self.stations.names()
    }

    /// Plan a journey leaving at `departure` ("HH:MM").
    pub fn predict(&self, start: &str, end: &str, departure: &str) -> Result<Itinerary, PlanError> {
        let departure = ClockMinutes::parse_hhmm(departure)?;
        self.planner().plan(start, end, departure)
    }

    pub fn planner(&self) -> Planner<'_, Model> {
        Planner::new(&self.graph, &self.stations, &self.model, &self.config)
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn graph(&self) -> &TransitGraph {
        &self.graph
    }
}

/// Yellow: Alpha -> Beta -> Hub; Blue: Hub -> Delta. Both "Hub" stops
/// are platforms of one station.
#[cfg(test)]
pub(crate) fn sample_timetable() -> Timetable {
    use crate::timetable::{RouteRecord, StopRecord, StopTimeRecord, TripRecord};

    let stops = vec![
        StopRecord::new("1", "Alpha", 28.600, 77.200),
        StopRecord::new("2", "Beta", 28.610, 77.200),
        StopRecord::new("3", "Hub", 28.620, 77.200),
        StopRecord::new("4", "Hub", 28.620, 77.201),
        StopRecord::new("5", "Delta", 28.620, 77.220),
    ];

    let mut stop_times = Vec::new();
    for run in 0..30u32 {
        let hour = 6 + run / 2;
        let minute = (run % 2) * 30;
        let at = |offset: u32| format!("{:02}:{:02}:00", hour, minute + offset);

        let yellow = format!("Y{run:02}");
        stop_times.push(StopTimeRecord::new(&yellow, "1", &at(0), &at(0), 1));
        stop_times.push(StopTimeRecord::new(&yellow, "2", &at(2), &at(3), 2));
        stop_times.push(StopTimeRecord::new(&yellow, "3", &at(5), &at(5), 3));

        let blue = format!("B{run:02}");
        stop_times.push(StopTimeRecord::new(&blue, "4", &at(10), &at(10), 1));
        stop_times.push(StopTimeRecord::new(&blue, "5", &at(14), &at(14), 2));
    }

    let routes = vec![
        RouteRecord::new("RY", Some("YELLOW_Alpha to Hub")),
        RouteRecord::new("RB", Some("BLUE_Hub to Delta")),
    ];
    let mut trips = Vec::new();
    for run in 0..30 {
        trips.push(TripRecord::new(&format!("Y{run:02}"), "RY"));
        trips.push(TripRecord::new(&format!("B{run:02}"), "RB"));
    }

    Timetable::from_records(stops, stop_times, routes, trips)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::{RouteRecord, StopRecord, StopTimeRecord, TripRecord};

    fn context() -> EtaContext {
        EtaContext::initialize(
            &sample_timetable(),
            &BoostConfig::new(50, 0.3, 8, 5),
            PlannerConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn lists_sorted_unique_stations() {
        let context = context();
        assert_eq!(context.list_stations(), ["Alpha", "Beta", "Delta", "Hub"]);
    }

    #[test]
    fn predicts_journey_across_interchange() {
        let context = context();

        let itinerary = context.predict("alpha", "DELTA", "08:00").unwrap();

        let lines: Vec<&str> = itinerary.segments.iter().map(|s| s.line.as_str()).collect();
        assert_eq!(lines, vec!["Yellow Line", "Transfer", "Blue Line"]);
        assert_eq!(itinerary.segments[0].stops, 2);
        assert_eq!(itinerary.segments[1].duration_minutes, 5.0);
        assert!(itinerary.segments.iter().all(|s| !s.switch_alert));

        // Each rail hop takes between 2 and 4 minutes in the sample feed
        let rail: f64 = itinerary
            .hops
            .iter()
            .filter(|h| !h.line.is_transfer())
            .map(|h| h.travel_minutes)
            .sum();
        assert!(rail > 6.0 && rail < 12.0, "rail minutes were {rail}");

        let total: f64 = itinerary.segments.iter().map(|s| s.duration_minutes).sum();
        assert!((total - itinerary.total_minutes).abs() < 1e-9);
    }

    #[test]
    fn predict_reports_request_errors() {
        let context = context();

        assert_eq!(
            context.predict("Alpha", "Atlantis", "08:00").unwrap_err(),
            PlanError::StationsNotFound
        );
        assert_eq!(
            context.predict("Delta", "Alpha", "08:00").unwrap_err(),
            PlanError::NoRoute
        );
        assert!(matches!(
            context.predict("Alpha", "Delta", "8 o'clock"),
            Err(PlanError::InvalidTime(_))
        ));
    }

    #[test]
    fn initialize_rejects_unusable_timetables() {
        let empty = EtaContext::initialize(
            &Timetable::default(),
            &BoostConfig::default(),
            PlannerConfig::default(),
        );
        assert!(matches!(empty, Err(InitError::Timetable(_))));

        // Stop times exist but none pair into a hop
        let single_calls = Timetable::from_records(
            vec![StopRecord::new("1", "Alpha", 28.6, 77.2)],
            vec![StopTimeRecord::new("T1", "1", "08:00:00", "08:00:00", 1)],
            vec![],
            vec![],
        );
        let err = EtaContext::initialize(
            &single_calls,
            &BoostConfig::default(),
            PlannerConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, InitError::Model(ModelError::EmptyTrainingSet)));
    }

    #[test]
    fn routes_through_stop_without_coordinates() {
        let mut beta = StopRecord::new("2", "Beta", 0.0, 0.0);
        beta.stop_lat = None;
        beta.stop_lon = None;
        let stops = vec![
            StopRecord::new("1", "Alpha", 28.600, 77.200),
            beta,
            StopRecord::new("3", "Gamma", 28.620, 77.200),
            StopRecord::new("4", "Delta", 28.630, 77.200),
        ];

        let mut stop_times = Vec::new();
        let mut trips = Vec::new();
        for run in 0..30u32 {
            let trip = format!("G{run:02}");
            let (hour, minute) = (6 + run / 2, (run % 2) * 30);
            let at = |offset: u32| format!("{:02}:{:02}:00", hour, minute + offset);
            stop_times.push(StopTimeRecord::new(&trip, "1", &at(0), &at(0), 1));
            stop_times.push(StopTimeRecord::new(&trip, "2", &at(2), &at(2), 2));
            stop_times.push(StopTimeRecord::new(&trip, "3", &at(4), &at(4), 3));
            stop_times.push(StopTimeRecord::new(&trip, "4", &at(7), &at(7), 4));
            trips.push(TripRecord::new(&trip, "RG"));
        }
        let timetable = Timetable::from_records(
            stops,
            stop_times,
            vec![RouteRecord::new("RG", Some("GREEN_Alpha to Delta"))],
            trips,
        );

        let context = EtaContext::initialize(
            &timetable,
            &BoostConfig::new(20, 0.3, 4, 5),
            PlannerConfig::default(),
        )
        .unwrap();

        assert_eq!(context.graph().edge_count(), 3);
        let itinerary = context.predict("Alpha", "Gamma", "08:00").unwrap();
        assert_eq!(itinerary.hop_count(), 2);
        assert_eq!(itinerary.segments.len(), 1);
        assert_eq!(itinerary.segments[0].line.as_str(), "Green Line");
        assert_eq!(itinerary.segments[0].end, "Gamma");
    }
}
