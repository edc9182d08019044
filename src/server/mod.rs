//! HTTP API.
//!
//! The route surface mirrors what the frontend consumes: the daily
//! question (with its parsed statement blocks), test-case display strings,
//! code submission plus status polling, the leaderboard, and a health
//! probe. Handlers live in [`routes`]; this module owns the router, the
//! shared state, and the serve loop.

pub mod routes;

use std::sync::Arc;
use std::time::Instant;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{KataError, Result};
use crate::judge::{self, Job};
use crate::storage::Store;

/// State shared by every handler.
#[derive(Clone)]
pub struct ServerState {
    pub store: Arc<Store>,
    pub config: Arc<Config>,
    pub queue: mpsc::Sender<Job>,
    pub started_at: Instant,
}

/// Builds the route table over the shared state.
pub fn router(state: ServerState) -> Router {
    Router::new()
        .route("/", get(routes::index))
        .route("/api/daily-question", get(routes::daily_question))
        .route("/api/get-test-cases", get(routes::get_test_cases))
        .route("/api/submit-code", post(routes::submit_code))
        .route("/api/submission/:job_id", get(routes::submission_status))
        .route("/api/leaderboard", get(routes::leaderboard))
        .route("/api/health", get(routes::health))
        .with_state(state)
}

/// Runs the HTTP API plus the judge worker until ctrl-c.
///
/// The worker owns the receiving end of the submission queue; once the
/// listener stops and the router (holding the last sender) is dropped, the
/// worker drains what is left and exits.
pub async fn serve(addr: &str, store: Arc<Store>, config: Config) -> Result<()> {
    let queue_depth = config.server.queue_depth.max(1) as usize;
    let (tx, rx) = mpsc::channel::<Job>(queue_depth);

    let worker = tokio::spawn(judge::worker::worker(
        rx,
        Arc::clone(&store),
        config.clone(),
    ));

    let state = ServerState {
        store,
        config: Arc::new(config),
        queue: tx,
        started_at: Instant::now(),
    };

    let app = router(state);
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|err| KataError::Server(format!("bind {addr}: {err}")))?;
    info!("listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| KataError::Server(format!("serve: {err}")))?;

    info!("shutting down, draining judge queue");
    worker
        .await
        .map_err(|err| KataError::Server(format!("judge worker panicked: {err}")))?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for shutdown signal");
    }
}
