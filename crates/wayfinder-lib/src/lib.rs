//! Wayfinder library entry points.
//!
//! This crate computes the shortest walkable route between two waypoints in
//! a small weighted graph of beacon-anchored positions. It prefers an
//! external AI completion service and falls back automatically to an exact
//! local algorithm whenever the remote path is unavailable, slow,
//! rate-limited, or returns malformed data. Consumers should depend on the
//! items exported here instead of reimplementing behavior:
//!
//! - [`GraphSnapshot`] / [`Waypoint`] - the immutable per-request graph
//! - [`shortest_path`] - the exact local solver
//! - [`RemotePlannerClient`] - the bounded-retry remote client
//! - [`PathPlanningOrchestrator`] - remote-first planning with fallback
//! - [`RouteOutcome`] - the terminal result contract

#![deny(warnings)]

pub mod error;
pub mod graph;
pub mod model;
pub mod normalize;
pub mod orchestrator;
pub mod remote;
pub mod route;
pub mod solver;

#[doc(hidden)]
pub mod test_helpers;

pub use error::{Error, Result};
pub use graph::GraphModel;
pub use model::{GraphSnapshot, Position, Waypoint};
pub use orchestrator::{AuthFailurePolicy, PathPlanningOrchestrator};
pub use remote::{RemoteConfig, RemoteError, RemotePlannerClient};
pub use route::{
    assemble_path_result, ErrorResult, FailureReason, PathResult, PathStep, RouteOutcome,
    WALKING_SPEED_MPS,
};
pub use solver::{shortest_path, validate_request, RouteRequest};
