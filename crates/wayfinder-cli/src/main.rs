use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use wayfinder_lib::{
    GraphSnapshot, PathPlanningOrchestrator, RemoteConfig, RemotePlannerClient, RouteOutcome,
    RouteRequest, Waypoint,
};

const API_KEY_ENV: &str = "WAYFINDER_API_KEY";

#[derive(Parser, Debug)]
#[command(author, version, about = "Wayfinder indoor route planning utilities")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute a route between two waypoint ids from a graph snapshot file.
    Route {
        /// Path to a JSON file containing an array of waypoints.
        #[arg(long)]
        graph: PathBuf,
        /// Start waypoint id.
        #[arg(long = "from")]
        from: String,
        /// Destination anchor waypoint id.
        #[arg(long = "to")]
        to: String,
        /// Override the remote planner endpoint URL.
        #[arg(long)]
        endpoint: Option<String>,
        /// Remote planner credential; falls back to WAYFINDER_API_KEY.
        /// Omit both to plan locally only.
        #[arg(long)]
        api_key: Option<String>,
        /// Treat the snapshot adjacency as undirected.
        #[arg(long)]
        symmetrize: bool,
        /// Emit the raw outcome as JSON instead of text.
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Route {
            graph,
            from,
            to,
            endpoint,
            api_key,
            symmetrize,
            json,
        } => handle_route(&graph, &from, &to, endpoint, api_key, symmetrize, json).await,
    }
}

#[allow(clippy::too_many_arguments)]
async fn handle_route(
    graph: &Path,
    from: &str,
    to: &str,
    endpoint: Option<String>,
    api_key: Option<String>,
    symmetrize: bool,
    json: bool,
) -> Result<()> {
    let snapshot = load_snapshot(graph, symmetrize)?;

    let mut config = RemoteConfig::default();
    if let Some(endpoint) = endpoint {
        config.endpoint = endpoint;
    }
    config.api_key = api_key.or_else(|| env::var(API_KEY_ENV).ok());

    let client = RemotePlannerClient::new(config).context("failed to build remote planner")?;
    let orchestrator = PathPlanningOrchestrator::new(client);

    let request = RouteRequest::new(from, to);
    let outcome = orchestrator
        .plan(&snapshot, &request, &CancellationToken::new())
        .await
        .context("route planning failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        render_text(&outcome);
    }
    Ok(())
}

fn load_snapshot(path: &Path, symmetrize: bool) -> Result<GraphSnapshot> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph file {}", path.display()))?;
    let waypoints: Vec<Waypoint> = serde_json::from_str(&contents)
        .with_context(|| format!("failed to parse waypoints from {}", path.display()))?;
    let snapshot = GraphSnapshot::from_waypoints(waypoints);
    Ok(if symmetrize {
        snapshot.symmetrized()
    } else {
        snapshot
    })
}

fn render_text(outcome: &RouteOutcome) {
    match outcome {
        RouteOutcome::Path(result) => {
            println!("{}", result.path_summary);
            for (index, step) in result.path.iter().enumerate() {
                println!("{:>3}: {} [{}]", index, step.instruction, step.beacon_mac);
            }
            for warning in &result.warnings {
                println!("warning: {warning}");
            }
        }
        RouteOutcome::Error(result) => {
            println!("error ({}): {}", result.reason, result.error);
            println!("{}", result.suggestion);
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
