use thiserror::Error;

use crate::route::ErrorResult;

/// Convenient result alias for the Wayfinder library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Raised when a route request references an id absent from the snapshot.
    #[error("unknown waypoint id: {id}")]
    UnknownWaypoint { id: String },

    /// Raised when the start id equals the destination anchor id.
    #[error("start and destination are the same waypoint: {id}")]
    SameLocation { id: String },

    /// Raised when the destination is unreachable from the start.
    #[error("no path available from {start} to {goal}")]
    NoPath { start: String, goal: String },

    /// Raised when the remote planner rejected the configured credentials.
    /// Surfaced directly by default so the caller can fix its configuration.
    #[error("remote planner rejected credentials: {message}")]
    RemoteAuth { message: String },

    /// Raised when the caller cancelled the route request. Terminal: no
    /// fallback is attempted for a cancelled call.
    #[error("route planning was cancelled")]
    Cancelled,
}

impl Error {
    /// Wire-level failure representation for user-visible route errors.
    ///
    /// Returns `None` for errors that are not part of the route result
    /// contract (auth failures, cancellation) and must propagate as typed
    /// errors instead.
    pub fn to_error_result(&self) -> Option<ErrorResult> {
        match self {
            Error::UnknownWaypoint { id } => Some(ErrorResult::invalid_input(id)),
            Error::SameLocation { id } => Some(ErrorResult::same_location(id)),
            Error::NoPath { start, goal } => Some(ErrorResult::no_path(start, goal)),
            Error::RemoteAuth { .. } | Error::Cancelled => None,
        }
    }
}
