//! Hop extraction from the timetable.
//!
//! Every pair of consecutive calls on one scheduled trip is a track link.
//! Deduplicated, links become the rail edges of the transit graph. Links
//! with usable times and coordinates also become hops, the training rows of
//! the travel-time model.

use std::collections::{BTreeMap, HashMap, HashSet};

use geo::{Distance, Geodesic, Point};
use tracing::debug;

use crate::domain::{ClockMinutes, LineName, StopId};
use crate::model::FeatureRow;
use crate::timetable::{StopTimeRecord, Timetable};

/// One scheduled movement between consecutive stops of a trip.
#[derive(Debug, Clone, PartialEq)]
pub struct Hop {
    pub origin: StopId,
    pub destination: StopId,
    pub line: LineName,
    pub distance_km: f64,
    /// Departure from the origin, minutes since midnight.
    pub departure_minute: f64,
    /// Arrival at the destination minus departure from the origin.
    pub duration_minutes: f64,
}

impl Hop {
    pub fn feature_row(&self) -> FeatureRow {
        FeatureRow::new(
            self.origin.clone(),
            self.destination.clone(),
            self.distance_km,
            self.departure_minute,
        )
    }
}

/// A scheduled connection between consecutive stops of a trip.
///
/// Kept even when the timetable row is too noisy to train on.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackLink {
    pub origin: StopId,
    pub destination: StopId,
    pub line: LineName,
    /// Zero when either stop has no coordinates.
    pub distance_km: f64,
}

/// Counts of candidate hops discarded while building the table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BuildStats {
    pub candidates: usize,
    pub unparseable_time: usize,
    pub non_positive_duration: usize,
    pub missing_stop: usize,
}

/// All hops and track links of the timetable, one per trip occurrence.
///
/// Both lists are ordered by trip id, then by stop sequence within the trip.
#[derive(Debug, Clone, Default)]
pub struct HopTable {
    pub hops: Vec<Hop>,
    pub links: Vec<TrackLink>,
    pub stats: BuildStats,
}

impl HopTable {
    pub fn len(&self) -> usize {
        self.hops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hops.is_empty()
    }

    /// Model inputs, one per hop.
    pub fn feature_rows(&self) -> Vec<FeatureRow> {
        self.hops.iter().map(Hop::feature_row).collect()
    }

    /// Observed durations, aligned with [`HopTable::feature_rows`].
    pub fn labels(&self) -> Vec<f64> {
        self.hops.iter().map(|hop| hop.duration_minutes).collect()
    }

    /// The first link seen for each (origin, destination) pair.
    ///
    /// "First" follows the table order, so when two lines serve the same
    /// pair the line of the lexicographically smallest trip id wins.
    pub fn unique_edges(&self) -> Vec<&TrackLink> {
        let mut seen = HashSet::new();
        self.links
            .iter()
            .filter(|&link| seen.insert((&link.origin, &link.destination)))
            .collect()
    }
}

/// Geodesic (WGS84) distance between two points in kilometres.
pub fn geodesic_km(from: Point<f64>, to: Point<f64>) -> f64 {
    Geodesic.distance(from, to) / 1000.0
}

/// Derive the hop table from the raw timetable.
///
/// Within each trip, calls are ordered by stop sequence and paired with
/// their successor. Every pair with two valid stop ids becomes a track link.
/// Only the training hops drop candidates with an unparseable time, a
/// non-positive duration or a stop without coordinates. Trips whose route
/// is unknown keep the generic line label.
pub fn build_hops(timetable: &Timetable) -> HopTable {
    let locations: HashMap<StopId, Point<f64>> = timetable
        .network_stops()
        .into_iter()
        .filter_map(|stop| Some((stop.id, stop.location?)))
        .collect();

    let line_by_route: HashMap<&str, LineName> = timetable
        .routes
        .iter()
        .map(|route| {
            let line = LineName::from_route_long_name(route.route_long_name.as_deref());
            (route.route_id.as_str(), line)
        })
        .collect();

    let line_by_trip: HashMap<&str, LineName> = timetable
        .trips
        .iter()
        .filter_map(|trip| {
            let line = line_by_route.get(trip.route_id.as_str())?;
            Some((trip.trip_id.as_str(), line.clone()))
        })
        .collect();

    let mut calls_by_trip: BTreeMap<&str, Vec<&StopTimeRecord>> = BTreeMap::new();
    for call in &timetable.stop_times {
        calls_by_trip.entry(call.trip_id.as_str()).or_default().push(call);
    }

    let mut stats = BuildStats::default();
    let mut hops = Vec::new();
    let mut links = Vec::new();

    for (trip_id, calls) in &mut calls_by_trip {
        calls.sort_by_key(|call| call.stop_sequence);
        let line = line_by_trip
            .get(trip_id)
            .cloned()
            .unwrap_or_else(LineName::fallback);

        for pair in calls.windows(2) {
            stats.candidates += 1;
            let Some(link) = link_between(pair[0], pair[1], &line, &locations) else {
                stats.missing_stop += 1;
                continue;
            };
            match hop_between(pair[0], pair[1], &link, &locations) {
                Ok(hop) => hops.push(hop),
                Err(Discard::UnparseableTime) => stats.unparseable_time += 1,
                Err(Discard::NonPositiveDuration) => stats.non_positive_duration += 1,
                Err(Discard::MissingStop) => stats.missing_stop += 1,
            }
            links.push(link);
        }
    }

    debug!(
        trips = calls_by_trip.len(),
        candidates = stats.candidates,
        kept = hops.len(),
        links = links.len(),
        unparseable_time = stats.unparseable_time,
        non_positive_duration = stats.non_positive_duration,
        missing_stop = stats.missing_stop,
        "Built hop table"
    );

    HopTable { hops, links, stats }
}

/// Why a candidate hop was left out of the table.
enum Discard {
    UnparseableTime,
    NonPositiveDuration,
    MissingStop,
}

fn link_between(
    current: &StopTimeRecord,
    next: &StopTimeRecord,
    line: &LineName,
    locations: &HashMap<StopId, Point<f64>>,
) -> Option<TrackLink> {
    let origin = StopId::parse(&current.stop_id).ok()?;
    let destination = StopId::parse(&next.stop_id).ok()?;
    let distance_km = match (locations.get(&origin), locations.get(&destination)) {
        (Some(from), Some(to)) => geodesic_km(*from, *to),
        _ => 0.0,
    };

    Some(TrackLink {
        origin,
        destination,
        line: line.clone(),
        distance_km,
    })
}

fn hop_between(
    current: &StopTimeRecord,
    next: &StopTimeRecord,
    link: &TrackLink,
    locations: &HashMap<StopId, Point<f64>>,
) -> Result<Hop, Discard> {
    let departure =
        ClockMinutes::parse_hms(&current.departure_time).map_err(|_| Discard::UnparseableTime)?;
    let arrival =
        ClockMinutes::parse_hms(&next.arrival_time).map_err(|_| Discard::UnparseableTime)?;

    let duration = arrival.minutes() - departure.minutes();
    if duration <= 0.0 {
        return Err(Discard::NonPositiveDuration);
    }

    if !locations.contains_key(&link.origin) || !locations.contains_key(&link.destination) {
        return Err(Discard::MissingStop);
    }

    Ok(Hop {
        origin: link.origin.clone(),
        destination: link.destination.clone(),
        line: link.line.clone(),
        distance_km: link.distance_km,
        departure_minute: departure.minutes(),
        duration_minutes: duration,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timetable::{RouteRecord, StopRecord, StopTimeRecord as St, TripRecord};

    fn id(s: &str) -> StopId {
        StopId::parse(s).unwrap()
    }

    fn stops() -> Vec<StopRecord> {
        vec![
            StopRecord::new("1", "Alpha", 28.60, 77.20),
            StopRecord::new("2", "Beta", 28.61, 77.20),
            StopRecord::new("3", "Gamma", 28.62, 77.20),
            StopRecord {
                stop_id: "4".to_string(),
                stop_name: "Nowhere".to_string(),
                stop_lat: None,
                stop_lon: None,
            },
        ]
    }

    fn routes_and_trips() -> (Vec<RouteRecord>, Vec<TripRecord>) {
        (
            vec![
                RouteRecord::new("R1", Some("YELLOW_North to South")),
                RouteRecord::new("R2", Some("BLUE_East to West")),
            ],
            vec![TripRecord::new("T1", "R1"), TripRecord::new("T2", "R2")],
        )
    }

    #[test]
    fn pairs_consecutive_calls_within_trip() {
        let (routes, trips) = routes_and_trips();
        let timetable = Timetable::from_records(
            stops(),
            vec![
                // Out of sequence order on purpose
                St::new("T1", "3", "08:06:00", "08:06:30", 3),
                St::new("T1", "1", "08:00:00", "08:00:30", 1),
                St::new("T1", "2", "08:03:00", "08:03:30", 2),
                St::new("T2", "1", "09:00:00", "09:00:00", 1),
            ],
            routes,
            trips,
        );

        let table = build_hops(&timetable);

        assert_eq!(table.len(), 2);
        let first = &table.hops[0];
        assert_eq!(first.origin, id("1"));
        assert_eq!(first.destination, id("2"));
        assert_eq!(first.line.as_str(), "Yellow Line");
        assert_eq!(first.departure_minute, 480.5);
        assert_eq!(first.duration_minutes, 2.5);

        let second = &table.hops[1];
        assert_eq!(second.origin, id("2"));
        assert_eq!(second.destination, id("3"));

        // The single T2 call never pairs with a T1 call
        assert!(table.hops.iter().all(|hop| hop.line.as_str() == "Yellow Line"));
        assert_eq!(table.stats.candidates, 2);
    }

    #[test]
    fn distance_is_geodesic_km() {
        let (routes, trips) = routes_and_trips();
        let timetable = Timetable::from_records(
            stops(),
            vec![
                St::new("T1", "1", "08:00:00", "08:00:00", 1),
                St::new("T1", "2", "08:02:00", "08:02:00", 2),
            ],
            routes,
            trips,
        );

        let table = build_hops(&timetable);

        // 0.01 degrees of latitude is roughly 1.1 km
        let distance = table.hops[0].distance_km;
        assert!((distance - 1.108).abs() < 0.01, "distance was {distance}");
    }

    #[test]
    fn drops_noise_rows() {
        let (routes, trips) = routes_and_trips();
        let timetable = Timetable::from_records(
            stops(),
            vec![
                St::new("T1", "1", "08:00:00", "08:05:00", 1),
                // Arrives before the previous departure
                St::new("T1", "2", "08:04:00", "bad", 2),
                // Previous departure unparseable
                St::new("T1", "3", "08:10:00", "08:10:00", 3),
                // No coordinates
                St::new("T1", "4", "08:12:00", "08:12:00", 4),
                // Past-midnight feed time
                St::new("T2", "1", "23:58:00", "23:59:00", 1),
                St::new("T2", "2", "24:01:00", "24:01:00", 2),
            ],
            routes,
            trips,
        );

        let table = build_hops(&timetable);

        assert!(table.is_empty());
        // Noisy rows still connect the stops they join
        let pairs: Vec<(&str, &str)> = table
            .links
            .iter()
            .map(|link| (link.origin.as_str(), link.destination.as_str()))
            .collect();
        assert_eq!(pairs, vec![("1", "2"), ("2", "3"), ("3", "4"), ("1", "2")]);
        assert_eq!(table.links[2].distance_km, 0.0);
        assert_eq!(
            table.stats,
            BuildStats {
                candidates: 4,
                unparseable_time: 2,
                non_positive_duration: 1,
                missing_stop: 1,
            }
        );
    }

    #[test]
    fn unknown_route_gets_generic_line() {
        let timetable = Timetable::from_records(
            stops(),
            vec![
                St::new("T9", "1", "08:00:00", "08:00:00", 1),
                St::new("T9", "2", "08:02:00", "08:02:00", 2),
            ],
            vec![],
            vec![],
        );

        let table = build_hops(&timetable);
        assert_eq!(table.hops[0].line, LineName::fallback());
    }

    #[test]
    fn training_matrix_and_unique_edges() {
        let (routes, trips) = routes_and_trips();
        let timetable = Timetable::from_records(
            stops(),
            vec![
                St::new("T1", "1", "08:00:00", "08:00:00", 1),
                St::new("T1", "2", "08:02:00", "08:02:00", 2),
                St::new("T2", "1", "09:00:00", "09:00:00", 1),
                St::new("T2", "2", "09:03:00", "09:03:00", 2),
            ],
            routes,
            trips,
        );

        let table = build_hops(&timetable);

        assert_eq!(table.feature_rows().len(), 2);
        assert_eq!(table.labels(), vec![2.0, 3.0]);
        assert_eq!(table.feature_rows()[1].departure_minute, 540.0);

        let edges = table.unique_edges();
        assert_eq!(edges.len(), 1);
        // T1 sorts before T2, so its line wins
        assert_eq!(edges[0].line.as_str(), "Yellow Line");
    }

    #[test]
    fn stop_without_coordinates_keeps_links_but_not_hops() {
        let (routes, trips) = routes_and_trips();
        let timetable = Timetable::from_records(
            stops(),
            vec![
                St::new("T1", "1", "08:00:00", "08:00:00", 1),
                St::new("T1", "4", "08:02:00", "08:02:00", 2),
                St::new("T1", "2", "08:04:00", "08:04:00", 3),
                // Unknown stop id in the middle of a trip
                St::new("T2", "2", "09:00:00", "09:00:00", 1),
                St::new("T2", "9", "09:02:00", "09:02:00", 2),
            ],
            routes,
            trips,
        );

        let table = build_hops(&timetable);

        assert!(table.is_empty());
        assert_eq!(table.stats.missing_stop, 3);

        let edges = table.unique_edges();
        assert_eq!(edges.len(), 3);
        assert_eq!(edges[0].origin, id("1"));
        assert_eq!(edges[0].destination, id("4"));
        assert_eq!(edges[0].line.as_str(), "Yellow Line");
        assert!(edges.iter().all(|edge| edge.distance_km == 0.0));
    }
}
