//! Station name lookup.

use std::collections::{BTreeSet, HashMap};

use crate::domain::StopId;
use crate::graph::TransitGraph;

/// Case-insensitive mapping from display names to stop ids.
///
/// An interchange has several stops under one name; lookups resolve to the
/// last of them in stop order, so the same name always gives the same stop.
#[derive(Debug, Clone, Default)]
pub struct StationIndex {
    by_name: HashMap<String, StopId>,
    names: Vec<String>,
}

impl StationIndex {
    /// Index every stop of the graph.
    pub fn from_graph(graph: &TransitGraph) -> Self {
        Self::from_stops(graph.stops().map(|node| (&node.id, node.name.as_str())))
    }

    /// Index `(id, name)` pairs in order.
    pub fn from_stops<'a>(stops: impl IntoIterator<Item = (&'a StopId, &'a str)>) -> Self {
        let mut by_name = HashMap::new();
        let mut names = BTreeSet::new();
        for (id, name) in stops {
            by_name.insert(name.to_lowercase(), id.clone());
            names.insert(name.to_string());
        }
        Self {
            by_name,
            names: names.into_iter().collect(),
        }
    }

    /// Resolve a display name, ignoring case.
    pub fn resolve(&self, name: &str) -> Option<&StopId> {
        self.by_name.get(&name.trim().to_lowercase())
    }

    /// Sorted, deduplicated display names.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
