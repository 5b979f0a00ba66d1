//! Directed stop graph with rail and transfer edges.
//!
//! Rail edges come from the deduplicated track links of the hop table. Transfer edges join
//! every pair of stops that share a display name: the platforms of one
//! interchange station.

use std::collections::{BTreeMap, HashMap, VecDeque};

use petgraph::algo::has_path_connecting;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use tracing::info;

use crate::domain::{LineName, Stop, StopId};
use crate::features::HopTable;

/// Nominal length of an in-station walk between platforms, in km.
pub const TRANSFER_DISTANCE_KM: f64 = 0.05;

/// What an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// A scheduled hop on a line.
    Rail,
    /// A walk between platforms of one station.
    Transfer,
}

/// Edge payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub line: LineName,
    pub distance_km: f64,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn rail(line: LineName, distance_km: f64) -> Self {
        Self {
            line,
            distance_km,
            kind: EdgeKind::Rail,
        }
    }

    pub fn transfer() -> Self {
        Self {
            line: LineName::transfer(),
            distance_km: TRANSFER_DISTANCE_KM,
            kind: EdgeKind::Transfer,
        }
    }
}

/// Node payload.
#[derive(Debug, Clone, PartialEq)]
pub struct StopNode {
    pub id: StopId,
    pub name: String,
}

/// The routing network. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct TransitGraph {
    graph: DiGraph<StopNode, Edge>,
    index: HashMap<StopId, NodeIndex>,
}

impl TransitGraph {
    /// Build the network from the stop list and the hop table.
    ///
    /// Each (origin, destination) pair gets at most one edge. Among track
    /// links the first in table order wins; a transfer between two
    /// same-named stops replaces any rail edge joining them.
    pub fn build(stops: &[Stop], hops: &HopTable) -> Self {
        let mut network = Self::default();

        for stop in stops {
            network.add_stop(stop);
        }

        let mut rail_edges = 0usize;
        for link in hops.unique_edges() {
            let (Some(&from), Some(&to)) = (
                network.index.get(&link.origin),
                network.index.get(&link.destination),
            ) else {
                continue;
            };
            network
                .graph
                .update_edge(from, to, Edge::rail(link.line.clone(), link.distance_km));
            rail_edges += 1;
        }

        let mut ids_by_name: BTreeMap<&str, Vec<NodeIndex>> = BTreeMap::new();
        for stop in stops {
            if let Some(&node) = network.index.get(&stop.id) {
                let ids = ids_by_name.entry(stop.name.as_str()).or_default();
                if !ids.contains(&node) {
                    ids.push(node);
                }
            }
        }

        let mut transfer_edges = 0usize;
        for nodes in ids_by_name.values().filter(|nodes| nodes.len() > 1) {
            for &from in nodes {
                for &to in nodes {
                    if from != to {
                        network.graph.update_edge(from, to, Edge::transfer());
                        transfer_edges += 1;
                    }
                }
            }
        }

        info!(
            stops = network.node_count(),
            edges = network.edge_count(),
            rail_edges,
            transfer_edges,
            "Built transit graph"
        );

        network
    }

    fn add_stop(&mut self, stop: &Stop) {
        let node = StopNode {
            id: stop.id.clone(),
            name: stop.name.clone(),
        };
        match self.index.get(&stop.id) {
            // A repeated id keeps its node; the later name wins.
            Some(&existing) => self.graph[existing] = node,
            None => {
                let index = self.graph.add_node(node);
                self.index.insert(stop.id.clone(), index);
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, id: &StopId) -> bool {
        self.index.contains_key(id)
    }

    /// Display name of a stop.
    pub fn stop_name(&self, id: &StopId) -> Option<&str> {
        let node = self.index.get(id)?;
        Some(self.graph[*node].name.as_str())
    }

    /// All stops, in insertion order.
    pub fn stops(&self) -> impl Iterator<Item = &StopNode> {
        self.graph.node_weights()
    }

    /// Outgoing edges of a stop with their target ids, newest edge first.
    ///
    /// Unknown stops have no neighbours.
    pub fn neighbors(&self, id: &StopId) -> Vec<(&StopId, &Edge)> {
        let Some(&node) = self.index.get(id) else {
            return Vec::new();
        };
        self.graph
            .edges(node)
            .map(|edge| (&self.graph[edge.target()].id, edge.weight()))
            .collect()
    }

    /// The edge from `from` to `to`, if any.
    pub fn edge(&self, from: &StopId, to: &StopId) -> Option<&Edge> {
        let from = self.index.get(from)?;
        let to = self.index.get(to)?;
        let edge = self.graph.find_edge(*from, *to)?;
        Some(&self.graph[edge])
    }

    /// Whether `to` is reachable from `from`.
    pub fn has_path(&self, from: &StopId, to: &StopId) -> bool {
        match (self.index.get(from), self.index.get(to)) {
            (Some(&from), Some(&to)) => has_path_connecting(&self.graph, from, to, None),
            _ => false,
        }
    }

    /// Fewest-edges path from `from` to `to`, both ends included.
    ///
    /// Edge lengths are ignored. Neighbours are visited in reverse edge
    /// insertion order (petgraph lists the newest edge first), so ties
    /// between equally short paths favour the later edge. Returns `None`
    /// when either stop is unknown or `to` is unreachable; `from == to`
    /// yields a one-stop path.
    pub fn shortest_path(&self, from: &StopId, to: &StopId) -> Option<Vec<StopId>> {
        let &source = self.index.get(from)?;
        let &target = self.index.get(to)?;

        let mut previous: Vec<Option<NodeIndex>> = vec![None; self.graph.node_count()];
        let mut visited = vec![false; self.graph.node_count()];
        let mut queue = VecDeque::new();
        visited[source.index()] = true;
        queue.push_back(source);

        while let Some(node) = queue.pop_front() {
            if node == target {
                break;
            }
            for next in self.graph.neighbors(node) {
                if !visited[next.index()] {
                    visited[next.index()] = true;
                    previous[next.index()] = Some(node);
                    queue.push_back(next);
                }
            }
        }

        if !visited[target.index()] {
            return None;
        }

        let mut path = vec![self.graph[target].id.clone()];
        let mut current = target;
        while let Some(node) = previous[current.index()] {
            path.push(self.graph[node].id.clone());
            current = node;
        }
        path.reverse();
        Some(path)
    }
}
