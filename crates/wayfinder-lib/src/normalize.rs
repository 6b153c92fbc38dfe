//! Validation of remote-produced route results.
//!
//! The local solver constructs its results directly and is trusted; the
//! remote planner is not. Any violation found here is treated by the
//! orchestrator exactly like a malformed response and triggers the local
//! fallback, so an unvalidated remote result can never leave the core.

use crate::route::{PathResult, RouteOutcome};

/// Check field ranges of a candidate outcome before it leaves the core.
///
/// Returns a description of the first violation found.
pub fn validate(outcome: &RouteOutcome) -> std::result::Result<(), String> {
    match outcome {
        RouteOutcome::Path(result) => validate_path_result(result),
        // Error results carry only typed fields; nothing to range-check.
        RouteOutcome::Error(_) => Ok(()),
    }
}

fn validate_path_result(result: &PathResult) -> std::result::Result<(), String> {
    if result.path.is_empty() {
        return Err("path is empty".to_string());
    }
    for (index, step) in result.path.iter().enumerate() {
        if step.beacon_mac.is_empty() {
            return Err(format!("step {index} has an empty beacon_mac"));
        }
        if !step.distance_to_next.is_finite() || step.distance_to_next < 0.0 {
            return Err(format!(
                "step {index} has invalid distance_to_next {}",
                step.distance_to_next
            ));
        }
    }
    if !result.total_distance.is_finite() || result.total_distance < 0.0 {
        return Err(format!(
            "total_distance {} is negative or not finite",
            result.total_distance
        ));
    }
    Ok(())
}
