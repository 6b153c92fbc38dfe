//! Optimality and invariant checks for the local solver.

use wayfinder_lib::test_helpers::{snapshot_from, waypoint};
use wayfinder_lib::{assemble_path_result, shortest_path, GraphSnapshot, RouteRequest, Waypoint};

/// Total Euclidean length of an id path over the snapshot.
fn path_distance(snapshot: &GraphSnapshot, path: &[String]) -> f64 {
    path.windows(2)
        .map(|pair| {
            let a = snapshot.get(&pair[0]).unwrap();
            let b = snapshot.get(&pair[1]).unwrap();
            a.position.distance_to(&b.position)
        })
        .sum()
}

/// Exhaustively enumerate simple paths and return the minimum distance.
fn brute_force_min_distance(snapshot: &GraphSnapshot, start: &str, goal: &str) -> Option<f64> {
    fn recurse(
        snapshot: &GraphSnapshot,
        current: &str,
        goal: &str,
        visited: &mut Vec<String>,
        distance: f64,
        best: &mut Option<f64>,
    ) {
        if current == goal {
            *best = Some(best.map_or(distance, |b: f64| b.min(distance)));
            return;
        }
        let Some(waypoint) = snapshot.get(current) else {
            return;
        };
        for neighbor in &waypoint.neighbors {
            let Some(next) = snapshot.get(neighbor) else {
                continue;
            };
            if visited.iter().any(|id| id == neighbor) {
                continue;
            }
            visited.push(neighbor.clone());
            let hop = waypoint.position.distance_to(&next.position);
            recurse(snapshot, neighbor, goal, visited, distance + hop, best);
            visited.pop();
        }
    }

    let mut best = None;
    let mut visited = vec![start.to_string()];
    recurse(snapshot, start, goal, &mut visited, 0.0, &mut best);
    best
}

fn assert_optimal(snapshot: &GraphSnapshot, start: &str, goal: &str) {
    let path = shortest_path(snapshot, &RouteRequest::new(start, goal))
        .unwrap_or_else(|err| panic!("expected a route from {start} to {goal}: {err}"));
    let solver_distance = path_distance(snapshot, &path);
    let optimal = brute_force_min_distance(snapshot, start, goal).unwrap();
    assert!(
        (solver_distance - optimal).abs() < 1e-9,
        "solver found {solver_distance}, brute force found {optimal}"
    );
}

fn ring_with_chords() -> Vec<Waypoint> {
    // Six waypoints on a ring plus two chords, directed both ways.
    vec![
        waypoint("n0", "N0", 0.0, 0.0, "G", &["n1", "n5", "n3"]),
        waypoint("n1", "N1", 10.0, 2.0, "G", &["n0", "n2"]),
        waypoint("n2", "N2", 20.0, 0.0, "G", &["n1", "n3", "n5"]),
        waypoint("n3", "N3", 20.0, 10.0, "G", &["n2", "n4", "n0"]),
        waypoint("n4", "N4", 10.0, 14.0, "G", &["n3", "n5"]),
        waypoint("n5", "N5", 0.0, 10.0, "G", &["n4", "n0", "n2"]),
    ]
}

#[test]
fn matches_brute_force_on_ring_with_chords() {
    let snapshot = snapshot_from(&ring_with_chords());
    for start in ["n0", "n1", "n2", "n3", "n4", "n5"] {
        for goal in ["n0", "n1", "n2", "n3", "n4", "n5"] {
            if start != goal {
                assert_optimal(&snapshot, start, goal);
            }
        }
    }
}

#[test]
fn matches_brute_force_on_asymmetric_graph() {
    // One-way shortcuts: the cheap edges only run in one direction.
    let snapshot = snapshot_from(&[
        waypoint("a", "A", 0.0, 0.0, "G", &["b", "d"]),
        waypoint("b", "B", 5.0, 0.0, "G", &["c"]),
        waypoint("c", "C", 10.0, 0.0, "G", &[]),
        waypoint("d", "D", 2.0, 8.0, "G", &["c", "b"]),
    ]);
    for goal in ["b", "c", "d"] {
        assert_optimal(&snapshot, "a", goal);
    }
}

#[test]
fn matches_brute_force_on_eight_node_grid() {
    // 4x2 grid, orthogonal edges both ways.
    let mut waypoints = Vec::new();
    for row in 0..2 {
        for col in 0..4 {
            let id = format!("g{row}{col}");
            let mut neighbors = Vec::new();
            if col > 0 {
                neighbors.push(format!("g{row}{}", col - 1));
            }
            if col < 3 {
                neighbors.push(format!("g{row}{}", col + 1));
            }
            if row > 0 {
                neighbors.push(format!("g{}{col}", row - 1));
            }
            if row < 1 {
                neighbors.push(format!("g{}{col}", row + 1));
            }
            let refs: Vec<&str> = neighbors.iter().map(String::as_str).collect();
            waypoints.push(waypoint(
                &id,
                &id.to_uppercase(),
                col as f64 * 7.0,
                row as f64 * 5.0,
                "G",
                &refs,
            ));
        }
    }
    let snapshot = snapshot_from(&waypoints);
    assert_optimal(&snapshot, "g00", "g13");
    assert_optimal(&snapshot, "g03", "g10");
}

#[test]
fn total_distance_matches_step_sum_within_tolerance() {
    let snapshot = snapshot_from(&ring_with_chords());
    let path = shortest_path(&snapshot, &RouteRequest::new("n0", "n4")).unwrap();
    let result = assemble_path_result(&snapshot, &path, Vec::new());

    let step_sum: f64 = result.path.iter().map(|step| step.distance_to_next).sum();
    let tolerance = 0.1 * result.path.len() as f64;
    assert!(
        (result.total_distance - step_sum).abs() <= tolerance,
        "total {} deviates from step sum {} beyond {tolerance}",
        result.total_distance,
        step_sum
    );
}
