// Test-only helpers shared by unit and integration tests.

use std::collections::HashMap;

use crate::model::{GraphSnapshot, Position, Waypoint};

/// Build a waypoint with the given adjacency and no metadata.
pub fn waypoint(id: &str, name: &str, x: f64, y: f64, floor: &str, neighbors: &[&str]) -> Waypoint {
    Waypoint {
        id: id.to_string(),
        name: name.to_string(),
        position: Position::new(x, y),
        floor: floor.to_string(),
        neighbors: neighbors.iter().map(|n| n.to_string()).collect(),
        metadata: HashMap::new(),
    }
}

/// Build a snapshot from a slice of waypoints, preserving order.
pub fn snapshot_from(waypoints: &[Waypoint]) -> GraphSnapshot {
    GraphSnapshot::from_waypoints(waypoints.to_vec())
}

/// The three collinear waypoints used throughout the scenario tests:
/// Entrance(0,0) <-> Corridor(20,0) <-> EastWing(40,0), all on floor G.
pub fn corridor_snapshot() -> GraphSnapshot {
    snapshot_from(&[
        waypoint("aa:bb:cc:00:00:01", "Entrance", 0.0, 0.0, "G", &["aa:bb:cc:00:00:02"]),
        waypoint(
            "aa:bb:cc:00:00:02",
            "Corridor",
            20.0,
            0.0,
            "G",
            &["aa:bb:cc:00:00:01", "aa:bb:cc:00:00:03"],
        ),
        waypoint("aa:bb:cc:00:00:03", "EastWing", 40.0, 0.0, "G", &["aa:bb:cc:00:00:02"]),
    ])
}
