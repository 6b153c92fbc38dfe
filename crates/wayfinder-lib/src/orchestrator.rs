//! Remote-first route planning with local fallback.
//!
//! The orchestrator runs a staged pipeline: validate the request, attempt
//! the remote planner, validate its response, and fall back to the exact
//! local solver when the remote path is unconfigured, slow, rate-limited,
//! or malformed. Every exit is a [`RouteOutcome`] except two typed errors:
//! auth rejection (surfaced by default so the caller can fix its
//! configuration) and cancellation (terminal, never silently completed).

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::model::GraphSnapshot;
use crate::normalize;
use crate::remote::{RemoteError, RemotePlannerClient};
use crate::route::{assemble_path_result, RouteOutcome};
use crate::solver::{self, RouteRequest};

/// What to do when the remote planner rejects the configured credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthFailurePolicy {
    /// Surface the auth failure as a typed error (default): it indicates a
    /// configuration problem the caller can act on.
    #[default]
    Surface,
    /// Treat auth failures like any other remote failure and fall back to
    /// the local solver with an advisory warning.
    Fallback,
}

/// Decision policy unifying the remote planner and the local solver behind
/// one contract.
#[derive(Debug, Clone)]
pub struct PathPlanningOrchestrator {
    remote: RemotePlannerClient,
    auth_policy: AuthFailurePolicy,
}

impl PathPlanningOrchestrator {
    pub fn new(remote: RemotePlannerClient) -> Self {
        Self {
            remote,
            auth_policy: AuthFailurePolicy::default(),
        }
    }

    pub fn with_auth_policy(mut self, policy: AuthFailurePolicy) -> Self {
        self.auth_policy = policy;
        self
    }

    /// Compute a route, preferring the remote planner.
    ///
    /// `Err` is returned only for auth rejection (under
    /// [`AuthFailurePolicy::Surface`]) and cancellation; every other
    /// outcome, including all local solver failures, arrives as a
    /// [`RouteOutcome`].
    pub async fn plan(
        &self,
        snapshot: &GraphSnapshot,
        request: &RouteRequest,
        cancel: &CancellationToken,
    ) -> Result<RouteOutcome> {
        // Invalid requests are terminal regardless of which path would
        // have computed them; the remote planner is not consulted.
        if let Err(err) = solver::validate_request(snapshot, request) {
            let result = err
                .to_error_result()
                .expect("request validation only yields wire-representable errors");
            return Ok(RouteOutcome::Error(result));
        }

        match self.remote.plan(snapshot, request, cancel).await {
            Ok(outcome) => match normalize::validate(&outcome) {
                Ok(()) => {
                    debug!("remote planner produced a valid result");
                    Ok(outcome)
                }
                Err(violation) => {
                    warn!(%violation, "remote result failed validation; falling back");
                    Ok(self.plan_local(
                        snapshot,
                        request,
                        format!("Remote result failed validation ({violation}); route computed locally."),
                    ))
                }
            },
            Err(RemoteError::Cancelled) => Err(Error::Cancelled),
            Err(RemoteError::Auth { status }) => match self.auth_policy {
                AuthFailurePolicy::Surface => Err(Error::RemoteAuth {
                    message: format!("authorization failed with status {status}"),
                }),
                AuthFailurePolicy::Fallback => {
                    warn!(status, "remote auth failed; falling back per policy");
                    Ok(self.plan_local(
                        snapshot,
                        request,
                        "Remote planner rejected credentials; route computed locally.".to_string(),
                    ))
                }
            },
            Err(err) => {
                debug!(%err, "remote planning unavailable; falling back");
                Ok(self.plan_local(
                    snapshot,
                    request,
                    format!("Remote planner unavailable ({err}); route computed locally."),
                ))
            }
        }
    }

    /// Exact local computation with an advisory warning attached.
    fn plan_local(
        &self,
        snapshot: &GraphSnapshot,
        request: &RouteRequest,
        warning: String,
    ) -> RouteOutcome {
        match solver::shortest_path(snapshot, request) {
            Ok(path) => RouteOutcome::Path(assemble_path_result(snapshot, &path, vec![warning])),
            Err(err) => {
                let result = err
                    .to_error_result()
                    .expect("local solver only yields wire-representable errors");
                RouteOutcome::Error(result)
            }
        }
    }
}
