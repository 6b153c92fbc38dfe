//! Remote AI planner client.
//!
//! Sends one chat-completion request per route request to an external
//! completion endpoint and expects the completion content to be a JSON
//! [`RouteOutcome`]. The client owns the whole transport policy: bounded
//! retries, exponential backoff with jitter, `Retry-After` hints,
//! per-attempt timeouts, and cancellation. Attempts for one request are
//! strictly sequential; there is never more than one in flight.

use std::time::Duration;

use rand::Rng;
use reqwest::header::{HeaderMap, RETRY_AFTER};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::model::GraphSnapshot;
use crate::route::{RouteOutcome, WALKING_SPEED_MPS};
use crate::solver::RouteRequest;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_BACKOFF_BASE: Duration = Duration::from_secs(1);
const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(400);

/// Configuration for the remote planner client.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Full completion endpoint URL.
    pub endpoint: String,
    /// Bearer credential. `None` means the client short-circuits with
    /// [`RemoteError::Unconfigured`] without touching the network.
    pub api_key: Option<String>,
    pub model: String,
    /// Retries after the first attempt (3 retries = 4 attempts total).
    pub max_retries: u32,
    /// Whole-attempt deadline, covering connection, headers, and body read.
    pub attempt_timeout: Duration,
    /// Base for the `base * 2^attempt` backoff schedule.
    pub backoff_base: Duration,
    /// Upper bound of the random jitter added to each backoff wait.
    pub max_jitter: Duration,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            max_retries: DEFAULT_MAX_RETRIES,
            attempt_timeout: DEFAULT_ATTEMPT_TIMEOUT,
            backoff_base: DEFAULT_BACKOFF_BASE,
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }
}

impl RemoteConfig {
    pub fn new(endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key,
            ..Self::default()
        }
    }
}

/// Failures produced by the remote planner client.
///
/// Only `Auth` and `Cancelled` reach the caller of the orchestrator; the
/// rest are consumed by the fallback policy.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// No credential configured; no network call was made.
    #[error("remote planner is not configured")]
    Unconfigured,

    /// Credential rejected. Never retried.
    #[error("remote planner rejected credentials (status {status})")]
    Auth { status: u16 },

    /// Retry budget exhausted against timeouts, 429s, or 5xx responses.
    #[error("remote planner unavailable after {attempts} attempt(s): {message}")]
    Transient { attempts: u32, message: String },

    /// Structural fault: unexpected status, unparseable body, or a
    /// completion that is not valid route JSON. Ends the attempt chain.
    #[error("remote planner returned malformed data: {message}")]
    Malformed { message: String },

    /// The caller cancelled the request. Terminal.
    #[error("remote planning was cancelled")]
    Cancelled,

    #[error("failed to construct HTTP client")]
    Client(#[source] reqwest::Error),
}

/// Fixed algorithmic instructions sent with every request.
const PLANNER_INSTRUCTIONS: &str = "You are an indoor navigation planner. \
Compute the shortest walkable route over the supplied waypoint graph using \
Euclidean distance between waypoint positions as the edge weight, following \
connectivity exactly as listed (edges are directed as given). Assume a \
constant walking speed of 1.3 m/s. Respond with a single JSON object and \
nothing else. On success: {\"success\": true, \"path\": [{\"beacon_mac\", \
\"beacon_name\", \"instruction\", \"distance_to_next\", \
\"estimated_time_seconds\"}], \"total_distance\": number, \
\"total_time_seconds\": integer, \"floor_changes\": integer, \
\"path_summary\": string, \"alternative_paths_available\": bool, \
\"warnings\": [string]}. On failure: {\"success\": false, \"error\": string, \
\"reason\": \"no_path_available\"|\"same_location\"|\"invalid_input\", \
\"suggestion\": string}.";

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

/// Outcome of a single attempt, classified for the retry loop.
enum AttemptError {
    /// Ends the chain immediately.
    Fatal(RemoteError),
    /// Worth another attempt; `delay_hint` carries a server-provided wait.
    Retryable {
        message: String,
        delay_hint: Option<Duration>,
    },
}

/// Client for the external route computation service.
#[derive(Debug, Clone)]
pub struct RemotePlannerClient {
    config: RemoteConfig,
    http: reqwest::Client,
}

impl RemotePlannerClient {
    pub fn new(config: RemoteConfig) -> Result<Self, RemoteError> {
        // The client-level timeout bounds the whole attempt, response body
        // included, not just the time to headers.
        let http = reqwest::Client::builder()
            .user_agent(user_agent())
            .timeout(config.attempt_timeout)
            .build()
            .map_err(RemoteError::Client)?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &RemoteConfig {
        &self.config
    }

    /// Request a route from the remote planner.
    ///
    /// Runs up to `max_retries + 1` sequential attempts. Backoff waits and
    /// in-flight attempts are abandoned promptly when `cancel` fires.
    pub async fn plan(
        &self,
        snapshot: &GraphSnapshot,
        request: &RouteRequest,
        cancel: &CancellationToken,
    ) -> Result<RouteOutcome, RemoteError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            debug!("remote planner has no credential; skipping network attempts");
            return Err(RemoteError::Unconfigured);
        };

        let body = self.completion_request(snapshot, request);
        let attempts = self.config.max_retries.saturating_add(1);
        let mut last_failure = String::new();

        for attempt in 0..attempts {
            match self.attempt(api_key, &body, cancel).await {
                Ok(outcome) => return Ok(outcome),
                Err(AttemptError::Fatal(err)) => return Err(err),
                Err(AttemptError::Retryable {
                    message,
                    delay_hint,
                }) => {
                    warn!(attempt, %message, "remote planning attempt failed");
                    last_failure = message;
                    if attempt + 1 < attempts {
                        let delay = delay_hint.unwrap_or_else(|| self.backoff_delay(attempt));
                        debug!(?delay, "waiting before next remote attempt");
                        tokio::select! {
                            _ = cancel.cancelled() => return Err(RemoteError::Cancelled),
                            _ = tokio::time::sleep(delay) => {}
                        }
                    }
                }
            }
        }

        Err(RemoteError::Transient {
            attempts,
            message: last_failure,
        })
    }

    async fn attempt(
        &self,
        api_key: &str,
        body: &CompletionRequest,
        cancel: &CancellationToken,
    ) -> Result<RouteOutcome, AttemptError> {
        let send = self
            .http
            .post(&self.config.endpoint)
            .bearer_auth(api_key)
            .json(body)
            .send();

        let response = tokio::select! {
            _ = cancel.cancelled() => return Err(AttemptError::Fatal(RemoteError::Cancelled)),
            sent = send => sent.map_err(|err| self.transport_failure(err))?,
        };

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(AttemptError::Fatal(RemoteError::Auth {
                status: status.as_u16(),
            }));
        }
        if status == StatusCode::TOO_MANY_REQUESTS {
            let delay_hint = retry_after_seconds(response.headers());
            return Err(AttemptError::Retryable {
                message: "rate limited (429)".to_string(),
                delay_hint,
            });
        }
        if status.is_server_error() {
            return Err(AttemptError::Retryable {
                message: format!("server error ({status})"),
                delay_hint: None,
            });
        }
        if status != StatusCode::OK {
            // Non-parseable success and oddball statuses are structural
            // faults, not transient ones; retrying will not fix them.
            return Err(AttemptError::Fatal(RemoteError::Malformed {
                message: format!("unexpected status {status}"),
            }));
        }

        let completion = tokio::select! {
            _ = cancel.cancelled() => return Err(AttemptError::Fatal(RemoteError::Cancelled)),
            parsed = response.json::<CompletionResponse>() => match parsed {
                Ok(completion) => completion,
                // A body that stalls past the attempt budget is a slow
                // server, not a malformed one.
                Err(err) if err.is_timeout() => return Err(self.transport_failure(err)),
                Err(err) => {
                    return Err(AttemptError::Fatal(RemoteError::Malformed {
                        message: format!("completion envelope did not parse: {err}"),
                    }))
                }
            },
        };

        let content = completion
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| {
                AttemptError::Fatal(RemoteError::Malformed {
                    message: "completion contained no choices".to_string(),
                })
            })?;

        serde_json::from_str::<RouteOutcome>(extract_json(content)).map_err(|err| {
            AttemptError::Fatal(RemoteError::Malformed {
                message: format!("completion content is not valid route JSON: {err}"),
            })
        })
    }

    fn completion_request(
        &self,
        snapshot: &GraphSnapshot,
        request: &RouteRequest,
    ) -> CompletionRequest {
        CompletionRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: PLANNER_INSTRUCTIONS.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_user_prompt(snapshot, request),
                },
            ],
            temperature: 0.0,
        }
    }

    /// Classify a transport-level failure as retryable, distinguishing the
    /// attempt timeout from other connection faults in the message.
    fn transport_failure(&self, err: reqwest::Error) -> AttemptError {
        let message = if err.is_timeout() {
            format!("attempt timed out after {:?}", self.config.attempt_timeout)
        } else {
            format!("transport error: {err}")
        };
        AttemptError::Retryable {
            message,
            delay_hint: None,
        }
    }

    fn backoff_delay(&self, attempt: u32) -> Duration {
        let exponential = self.config.backoff_base * 2u32.saturating_pow(attempt);
        exponential + random_jitter(self.config.max_jitter)
    }
}

fn user_agent() -> String {
    format!("wayfinder-lib/{}", env!("CARGO_PKG_VERSION"))
}

/// Compact textual encoding of the snapshot, one waypoint per line:
/// `id: name (floor F) at (x, y) -> [neighbor ids]`.
fn encode_snapshot(snapshot: &GraphSnapshot) -> String {
    let mut lines = Vec::with_capacity(snapshot.len());
    for waypoint in snapshot.iter() {
        lines.push(format!(
            "{}: {} (floor {}) at ({:.1}, {:.1}) -> [{}]",
            waypoint.id,
            waypoint.name,
            waypoint.floor,
            waypoint.position.x,
            waypoint.position.y,
            waypoint.neighbors.join(", "),
        ));
    }
    lines.join("\n")
}

fn build_user_prompt(snapshot: &GraphSnapshot, request: &RouteRequest) -> String {
    format!(
        "Waypoint graph (positions in meters, walking speed {WALKING_SPEED_MPS} m/s):\n{}\n\n\
         Find the shortest walkable route from waypoint {} to waypoint {}.",
        encode_snapshot(snapshot),
        request.start_id,
        request.destination_id,
    )
}

/// Strip an optional Markdown code fence from completion content.
fn extract_json(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(stripped) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let stripped = stripped.strip_prefix("json").unwrap_or(stripped);
    stripped.strip_suffix("```").unwrap_or(stripped).trim()
}

fn retry_after_seconds(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

fn random_jitter(max: Duration) -> Duration {
    let max_ms = max.as_millis() as u64;
    if max_ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{snapshot_from, waypoint};

    #[test]
    fn unconfigured_client_short_circuits_without_network() {
        let client = RemotePlannerClient::new(RemoteConfig::default()).unwrap();
        let snapshot = snapshot_from(&[waypoint("a", "A", 0.0, 0.0, "G", &[])]);
        let request = RouteRequest::new("a", "a");
        let cancel = CancellationToken::new();

        let result = tokio_test::block_on(client.plan(&snapshot, &request, &cancel));
        assert!(matches!(result, Err(RemoteError::Unconfigured)));
    }

    #[test]
    fn snapshot_encoding_is_one_line_per_waypoint() {
        let snapshot = snapshot_from(&[
            waypoint("aa:01", "Entrance", 0.0, 0.0, "G", &["aa:02"]),
            waypoint("aa:02", "Corridor", 20.0, 0.0, "G", &["aa:01"]),
        ]);
        let encoded = encode_snapshot(&snapshot);
        let lines: Vec<&str> = encoded.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "aa:01: Entrance (floor G) at (0.0, 0.0) -> [aa:02]");
    }

    #[test]
    fn extract_json_strips_code_fences() {
        assert_eq!(extract_json("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(extract_json("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(extract_json("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn retry_after_parses_whole_seconds_only() {
        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, "7".parse().unwrap());
        assert_eq!(retry_after_seconds(&headers), Some(Duration::from_secs(7)));

        let mut headers = HeaderMap::new();
        headers.insert(RETRY_AFTER, "Wed, 21 Oct 2026 07:28:00 GMT".parse().unwrap());
        assert_eq!(retry_after_seconds(&headers), None);
        assert_eq!(retry_after_seconds(&HeaderMap::new()), None);
    }

    #[test]
    fn backoff_grows_exponentially_within_jitter_bound() {
        let config = RemoteConfig {
            backoff_base: Duration::from_millis(100),
            max_jitter: Duration::from_millis(50),
            ..RemoteConfig::default()
        };
        let client = RemotePlannerClient::new(config).unwrap();

        for attempt in 0..3 {
            let delay = client.backoff_delay(attempt);
            let floor = Duration::from_millis(100 * (1 << attempt));
            assert!(delay >= floor);
            assert!(delay <= floor + Duration::from_millis(50));
        }
    }
}
