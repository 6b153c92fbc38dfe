//! Exact local shortest-path solver.
//!
//! Deterministic label-setting (Dijkstra-style) search over the directed
//! adjacency of a [`GraphSnapshot`], with edge weight equal to Euclidean
//! distance. Used directly and as the fallback whenever the remote planner
//! is unavailable or untrusted.

use std::collections::{HashMap, HashSet};

use crate::error::{Error, Result};
use crate::graph::GraphModel;
use crate::model::GraphSnapshot;

/// A single-pair route request: start waypoint and destination anchor.
///
/// The destination anchor is the waypoint nearest a logical destination;
/// the destination concept itself lives outside the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRequest {
    pub start_id: String,
    pub destination_id: String,
}

impl RouteRequest {
    pub fn new(start_id: impl Into<String>, destination_id: impl Into<String>) -> Self {
        Self {
            start_id: start_id.into(),
            destination_id: destination_id.into(),
        }
    }
}

/// Validate a request against the snapshot without running the search.
///
/// Shared by the solver and the orchestrator so invalid requests fail the
/// same way regardless of which computation path would have run.
pub fn validate_request(snapshot: &GraphSnapshot, request: &RouteRequest) -> Result<()> {
    if !snapshot.contains(&request.start_id) {
        return Err(Error::UnknownWaypoint {
            id: request.start_id.clone(),
        });
    }
    if !snapshot.contains(&request.destination_id) {
        return Err(Error::UnknownWaypoint {
            id: request.destination_id.clone(),
        });
    }
    if request.start_id == request.destination_id {
        return Err(Error::SameLocation {
            id: request.start_id.clone(),
        });
    }
    Ok(())
}

/// Compute the exact shortest path from start to destination anchor.
///
/// The unvisited minimum is found by a linear scan in snapshot insertion
/// order, so distance ties settle on the waypoint encountered first in that
/// order. This tie-break is fixed contract, not an implementation detail:
/// it makes path selection reproducible on symmetric graphs. The scan is
/// O(V^2), which is fine at building scale.
///
/// Returns the waypoint id sequence in start-to-destination order.
pub fn shortest_path(snapshot: &GraphSnapshot, request: &RouteRequest) -> Result<Vec<String>> {
    validate_request(snapshot, request)?;

    let model = GraphModel::new(snapshot);
    let start = request.start_id.as_str();
    let goal = request.destination_id.as_str();

    let mut distances: HashMap<&str, f64> = HashMap::new();
    let mut predecessors: HashMap<&str, &str> = HashMap::new();
    let mut settled: HashSet<&str> = HashSet::new();

    distances.insert(start, 0.0);

    loop {
        // Select the unvisited waypoint with minimum tentative distance.
        // Strict `<` keeps the first-encountered waypoint on ties.
        let mut current: Option<&str> = None;
        let mut best = f64::INFINITY;
        for id in snapshot.ids() {
            if settled.contains(id) {
                continue;
            }
            if let Some(&distance) = distances.get(id) {
                if distance < best {
                    best = distance;
                    current = Some(id);
                }
            }
        }

        // No unvisited waypoint has finite distance: exhausted.
        let Some(current) = current else {
            break;
        };
        if current == goal {
            break;
        }
        settled.insert(current);

        let here = model
            .lookup(current)
            .expect("settled ids come from the snapshot");
        for neighbor in model.neighbors(current) {
            let candidate = best + model.edge_weight(here, neighbor);
            let known = distances
                .get(neighbor.id.as_str())
                .copied()
                .unwrap_or(f64::INFINITY);
            if candidate < known {
                distances.insert(&neighbor.id, candidate);
                predecessors.insert(&neighbor.id, current);
            }
        }
    }

    if !distances.contains_key(goal) {
        return Err(Error::NoPath {
            start: start.to_string(),
            goal: goal.to_string(),
        });
    }

    Ok(reconstruct_path(&predecessors, start, goal))
}

fn reconstruct_path(predecessors: &HashMap<&str, &str>, start: &str, goal: &str) -> Vec<String> {
    let mut path = Vec::new();
    let mut current = goal;
    loop {
        path.push(current.to_string());
        if current == start {
            break;
        }
        match predecessors.get(current) {
            Some(&previous) => current = previous,
            None => break,
        }
    }
    path.reverse();
    path
}
