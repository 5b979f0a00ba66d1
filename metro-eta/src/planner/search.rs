//! Route search and hop timing.
//!
//! A request is answered in three steps: resolve both station names, find
//! the fewest-hops path through the transit graph, then walk that path with
//! a running clock, asking the travel-time model for every rail hop.

use tracing::{debug, trace};

use crate::domain::{ClockMinutes, StopId, TimeError};
use crate::graph::{EdgeKind, TransitGraph};
use crate::model::{DurationModel, FeatureRow};

use super::config::PlannerConfig;
use super::itinerary::{HopEstimate, Itinerary};
use super::stations::StationIndex;

/// Error from route planning.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanError {
    /// One or both names are not known stations
    #[error("Stations not found. Please select from the list.")]
    StationsNotFound,

    /// The destination cannot be reached from the origin
    #[error("No route available between these stations.")]
    NoRoute,

    /// The departure time could not be parsed
    #[error("Invalid departure time: {0}")]
    InvalidTime(#[from] TimeError),
}

/// Route planner over a built network and a trained model.
pub struct Planner<'a, M: DurationModel> {
    graph: &'a TransitGraph,
    stations: &'a StationIndex,
    model: &'a M,
    config: &'a PlannerConfig,
}

impl<'a, M: DurationModel> Planner<'a, M> {
    /// Create a new planner.
    pub fn new(
        graph: &'a TransitGraph,
        stations: &'a StationIndex,
        model: &'a M,
        config: &'a PlannerConfig,
    ) -> Self {
        Self {
            graph,
            stations,
            model,
            config,
        }
    }

    /// Plan a journey between two station names.
    pub fn plan(
        &self,
        origin: &str,
        destination: &str,
        departure: ClockMinutes,
    ) -> Result<Itinerary, PlanError> {
        let (Some(from), Some(to)) = (
            self.stations.resolve(origin),
            self.stations.resolve(destination),
        ) else {
            return Err(PlanError::StationsNotFound);
        };

        self.plan_between(from, to, departure)
    }

    /// Plan a journey between two stop ids.
    pub fn plan_between(
        &self,
        from: &StopId,
        to: &StopId,
        departure: ClockMinutes,
    ) -> Result<Itinerary, PlanError> {
        let path = self
            .graph
            .shortest_path(from, to)
            .ok_or(PlanError::NoRoute)?;

        let hops = self.estimate_hops(&path, departure)?;

        debug!(
            %from,
            %to,
            departure = %departure,
            hops = hops.len(),
            "Planned route"
        );

        Ok(Itinerary::from_hops(departure, hops, |id| {
            self.graph.stop_name(id).unwrap_or(id.as_str()).to_string()
        }))
    }

    /// Time every edge of `path`, advancing the clock hop by hop.
    fn estimate_hops(
        &self,
        path: &[StopId],
        departure: ClockMinutes,
    ) -> Result<Vec<HopEstimate>, PlanError> {
        let mut clock = departure;
        let mut after_transfer = false;
        let mut hops = Vec::with_capacity(path.len().saturating_sub(1));

        for (index, pair) in path.windows(2).enumerate() {
            let (from, to) = (&pair[0], &pair[1]);
            let edge = self.graph.edge(from, to).ok_or(PlanError::NoRoute)?;

            let travel_minutes = match edge.kind {
                EdgeKind::Transfer => self.config.transfer_mins,
                EdgeKind::Rail => {
                    let row = FeatureRow::new(
                        from.clone(),
                        to.clone(),
                        edge.distance_km,
                        clock.minute_of_day(),
                    );
                    self.model.predict_minutes(&row)
                }
            };

            let wait_minutes = if index == 0 || after_transfer {
                self.config.boarding_wait_mins
            } else {
                0.0
            };

            let hop = HopEstimate {
                from: from.clone(),
                to: to.clone(),
                line: edge.line.clone(),
                kind: edge.kind,
                departure: clock,
                travel_minutes,
                wait_minutes,
            };
            trace!(
                %from,
                %to,
                line = %hop.line,
                travel = hop.travel_minutes,
                wait = hop.wait_minutes,
                "Timed hop"
            );
            clock = clock.advance(hop.total_minutes());
            after_transfer = edge.kind == EdgeKind::Transfer;
            hops.push(hop);
        }

        Ok(hops)
    }
}

#[cfg(test)]
#[path = "search_tests.rs"]
mod tests;
