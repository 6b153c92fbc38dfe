use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// 2-D position of a waypoint in meters, relative to the building origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    pub fn distance_to(&self, other: &Position) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// A node in the navigable graph, anchored to a positioning beacon.
///
/// Waypoints are produced by the device/location subsystem and are immutable
/// for the lifetime of one route request. `neighbors` holds the adjacency
/// exactly as declared by the source data; entries that do not resolve to a
/// snapshot member are ignored during routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    /// Stable identifier (beacon MAC address).
    pub id: String,
    /// Display name shown in instructions.
    pub name: String,
    pub position: Position,
    /// Floor label, compared verbatim when counting floor changes.
    pub floor: String,
    #[serde(default)]
    pub neighbors: Vec<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
}

/// Immutable per-request view of waypoints and their adjacency.
///
/// Iteration follows insertion order, which is part of the contract: the
/// local solver breaks distance ties in favor of the waypoint encountered
/// first in this order.
#[derive(Debug, Clone, Default)]
pub struct GraphSnapshot {
    order: Vec<String>,
    by_id: HashMap<String, Waypoint>,
}

impl GraphSnapshot {
    /// Build a snapshot from a list of waypoints.
    ///
    /// A duplicate id replaces the earlier waypoint's data but keeps its
    /// original position in the iteration order.
    pub fn from_waypoints(waypoints: Vec<Waypoint>) -> Self {
        let mut order = Vec::with_capacity(waypoints.len());
        let mut by_id = HashMap::with_capacity(waypoints.len());
        for waypoint in waypoints {
            if !by_id.contains_key(&waypoint.id) {
                order.push(waypoint.id.clone());
            }
            by_id.insert(waypoint.id.clone(), waypoint);
        }
        Self { order, by_id }
    }

    pub fn get(&self, id: &str) -> Option<&Waypoint> {
        self.by_id.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// Waypoint ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Waypoints in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> {
        self.order.iter().filter_map(|id| self.by_id.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Return a copy with the adjacency made symmetric.
    ///
    /// The routing core consumes adjacency as declared (directed). Source
    /// data with asymmetric neighbor lists that is meant to describe
    /// undirected connectivity can opt in to symmetrization here instead of
    /// the core guessing.
    pub fn symmetrized(&self) -> GraphSnapshot {
        let mut snapshot = self.clone();
        let mut reverse: Vec<(String, String)> = Vec::new();
        for waypoint in snapshot.iter() {
            for neighbor in &waypoint.neighbors {
                if snapshot.contains(neighbor) {
                    reverse.push((neighbor.clone(), waypoint.id.clone()));
                }
            }
        }
        for (from, to) in reverse {
            if let Some(waypoint) = snapshot.by_id.get_mut(&from) {
                if !waypoint.neighbors.contains(&to) {
                    waypoint.neighbors.push(to);
                }
            }
        }
        snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::waypoint;

    #[test]
    fn distance_is_euclidean() {
        let a = Position::new(0.0, 0.0);
        let b = Position::new(3.0, 4.0);
        assert_eq!(a.distance_to(&b), 5.0);
    }

    #[test]
    fn snapshot_preserves_insertion_order() {
        let snapshot = GraphSnapshot::from_waypoints(vec![
            waypoint("b", "Second", 1.0, 0.0, "G", &[]),
            waypoint("a", "First", 0.0, 0.0, "G", &[]),
        ]);
        let ids: Vec<&str> = snapshot.ids().collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn duplicate_id_replaces_data_but_keeps_order() {
        let snapshot = GraphSnapshot::from_waypoints(vec![
            waypoint("a", "Old", 0.0, 0.0, "G", &[]),
            waypoint("b", "Other", 1.0, 0.0, "G", &[]),
            waypoint("a", "New", 2.0, 0.0, "G", &[]),
        ]);
        let ids: Vec<&str> = snapshot.ids().collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(snapshot.get("a").map(|w| w.name.as_str()), Some("New"));
    }

    #[test]
    fn symmetrized_adds_missing_reverse_edges() {
        let snapshot = GraphSnapshot::from_waypoints(vec![
            waypoint("a", "A", 0.0, 0.0, "G", &["b"]),
            waypoint("b", "B", 1.0, 0.0, "G", &[]),
        ]);
        let symmetric = snapshot.symmetrized();
        assert!(symmetric
            .get("b")
            .map(|w| w.neighbors.contains(&"a".to_string()))
            .unwrap_or(false));
        // The original snapshot is untouched.
        assert!(snapshot.get("b").map(|w| w.neighbors.is_empty()).unwrap());
    }
}
