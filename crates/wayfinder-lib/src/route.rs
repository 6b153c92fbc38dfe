//! Route result contract shared by the local solver and the remote planner.
//!
//! Whichever path computed the route, it leaves the core as exactly one of
//! [`PathResult`] or [`ErrorResult`], carried by the [`RouteOutcome`] tagged
//! union. On the wire the variants are discriminated by a boolean `success`
//! field, matching the remote planner's response contract.

use std::fmt;

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::model::GraphSnapshot;

/// Constant walking speed used for all time estimates, in meters per second.
pub const WALKING_SPEED_MPS: f64 = 1.3;

/// One hop of a computed route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathStep {
    /// Waypoint identifier (beacon MAC).
    pub beacon_mac: String,
    /// Waypoint display name.
    pub beacon_name: String,
    /// Human-readable instruction for this step.
    pub instruction: String,
    /// Distance to the next step in meters, one decimal. Zero for the final step.
    pub distance_to_next: f64,
    /// Estimated walking time to the next step in whole seconds.
    pub estimated_time_seconds: u64,
}

/// Successful route computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathResult {
    pub path: Vec<PathStep>,
    /// Total route distance in meters, one decimal.
    pub total_distance: f64,
    /// Total walking time in whole seconds.
    pub total_time_seconds: u64,
    /// Count of adjacent step pairs whose floor labels differ.
    pub floor_changes: u32,
    pub path_summary: String,
    /// Alternative routes are never explored; retained for the wire contract.
    pub alternative_paths_available: bool,
    /// Advisory warnings. Empty when the remote path succeeded cleanly;
    /// non-empty whenever the result was computed by the local fallback.
    #[serde(default)]
    pub warnings: Vec<String>,
}

/// Reason code attached to a failed route computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    NoPathAvailable,
    SameLocation,
    InvalidInput,
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            FailureReason::NoPathAvailable => "no_path_available",
            FailureReason::SameLocation => "same_location",
            FailureReason::InvalidInput => "invalid_input",
        };
        f.write_str(value)
    }
}

/// Failed route computation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResult {
    pub error: String,
    pub reason: FailureReason,
    pub suggestion: String,
}

impl ErrorResult {
    pub fn invalid_input(id: &str) -> Self {
        Self {
            error: format!("unknown waypoint id: {id}"),
            reason: FailureReason::InvalidInput,
            suggestion: "Check that both waypoint ids exist in the current graph snapshot."
                .to_string(),
        }
    }

    pub fn same_location(id: &str) -> Self {
        Self {
            error: format!("start and destination are the same waypoint: {id}"),
            reason: FailureReason::SameLocation,
            suggestion: "You are already at the destination.".to_string(),
        }
    }

    pub fn no_path(start: &str, goal: &str) -> Self {
        Self {
            error: format!("no path available from {start} to {goal}"),
            reason: FailureReason::NoPathAvailable,
            suggestion: "Verify the waypoint connectivity or choose a different destination."
                .to_string(),
        }
    }
}

/// Terminal result of a route request: exactly one of the two variants.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Path(PathResult),
    Error(ErrorResult),
}

impl Serialize for RouteOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let (success, value) = match self {
            RouteOutcome::Path(result) => (true, serde_json::to_value(result)),
            RouteOutcome::Error(result) => (false, serde_json::to_value(result)),
        };
        let mut value = value.map_err(S::Error::custom)?;
        match value.as_object_mut() {
            Some(map) => {
                map.insert("success".to_string(), serde_json::Value::Bool(success));
            }
            None => return Err(S::Error::custom("route outcome must serialize to an object")),
        }
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RouteOutcome {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        let success = value
            .get("success")
            .and_then(serde_json::Value::as_bool)
            .ok_or_else(|| D::Error::custom("missing or non-boolean `success` discriminator"))?;
        if success {
            serde_json::from_value(value)
                .map(RouteOutcome::Path)
                .map_err(D::Error::custom)
        } else {
            serde_json::from_value(value)
                .map(RouteOutcome::Error)
                .map_err(D::Error::custom)
        }
    }
}

/// Round a non-negative distance to one decimal, half-up.
pub(crate) fn round_distance(meters: f64) -> f64 {
    (meters * 10.0 + 0.5).floor() / 10.0
}

/// Walking time for a distance, rounded half-up to whole seconds.
pub(crate) fn walk_seconds(meters: f64) -> u64 {
    (meters / WALKING_SPEED_MPS + 0.5).floor() as u64
}

/// Assemble a [`PathResult`] from an ordered waypoint id sequence.
///
/// This is the postprocessing shared by both computation paths: per-step
/// distances and time estimates, totals from the unrounded sums, and the
/// floor-change count. The id sequence must reference snapshot members and
/// contain at least two entries, which the solver guarantees.
pub fn assemble_path_result(
    snapshot: &GraphSnapshot,
    path: &[String],
    warnings: Vec<String>,
) -> PathResult {
    let waypoints: Vec<_> = path
        .iter()
        .map(|id| {
            snapshot
                .get(id)
                .expect("solver output references snapshot members")
        })
        .collect();

    let mut steps = Vec::with_capacity(waypoints.len());
    let mut total_meters = 0.0;
    let mut floor_changes = 0u32;

    for (index, waypoint) in waypoints.iter().enumerate() {
        let next = waypoints.get(index + 1);
        let (distance, instruction) = match next {
            Some(next) => {
                let meters = waypoint.position.distance_to(&next.position);
                total_meters += meters;
                if waypoint.floor != next.floor {
                    floor_changes += 1;
                    let text = format!(
                        "Take the stairs or elevator to floor {} and continue to {}",
                        next.floor, next.name
                    );
                    (meters, text)
                } else {
                    (
                        meters,
                        format!("Walk {:.1} m to {}", round_distance(meters), next.name),
                    )
                }
            }
            None => (0.0, format!("You have arrived at {}", waypoint.name)),
        };

        steps.push(PathStep {
            beacon_mac: waypoint.id.clone(),
            beacon_name: waypoint.name.clone(),
            instruction,
            distance_to_next: round_distance(distance),
            estimated_time_seconds: walk_seconds(distance),
        });
    }

    let total_distance = round_distance(total_meters);
    let total_time_seconds = walk_seconds(total_meters);
    let start_name = &waypoints[0].name;
    let goal_name = &waypoints[waypoints.len() - 1].name;
    let floors = if floor_changes > 0 {
        format!(", {floor_changes} floor change(s)")
    } else {
        String::new()
    };
    let path_summary = format!(
        "Route from {start_name} to {goal_name}: {} stops, {total_distance:.1} m, about {total_time_seconds} s{floors}",
        waypoints.len(),
    );

    PathResult {
        path: steps,
        total_distance,
        total_time_seconds,
        floor_changes,
        path_summary,
        alternative_paths_available: false,
        warnings,
    }
}
