//! Health Check Server - Liveness and Readiness Probes
//!
//! Exposes /live and /ready endpoints via axum 0.7 while the market
//! monitor runs. Readiness depends on node reachability and on the
//! monitor loop still running.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use tokio::sync::broadcast;
use tracing::{info, instrument};

/// Shared health state polled by readiness probes.
#[derive(Debug, Clone)]
pub struct HealthState {
    /// Whether the last market poll reached the node.
    pub chain_healthy: Arc<AtomicBool>,
    /// Whether the monitor loop is running.
    pub monitor_running: Arc<AtomicBool>,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// Healthy and running until told otherwise.
    pub fn new() -> Self {
        Self {
            chain_healthy: Arc::new(AtomicBool::new(true)),
            monitor_running: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn set_chain_healthy(&self, healthy: bool) {
        self.chain_healthy.store(healthy, Ordering::Relaxed);
    }

    pub fn set_monitor_running(&self, running: bool) {
        self.monitor_running.store(running, Ordering::Relaxed);
    }

    pub fn is_ready(&self) -> bool {
        self.chain_healthy.load(Ordering::Relaxed) && self.monitor_running.load(Ordering::Relaxed)
    }
}

/// Axum-based health check HTTP server.
pub struct HealthServer {
    state: Arc<HealthState>,
    port: u16,
}

impl HealthServer {
    pub fn new(state: Arc<HealthState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Serve until the shutdown broadcast fires.
    #[instrument(skip(self, shutdown_rx))]
    pub async fn run(self, mut shutdown_rx: broadcast::Receiver<()>) -> anyhow::Result<()> {
        let app = Router::new()
            .route("/live", get(Self::liveness))
            .route("/ready", get(Self::readiness))
            .with_state(Arc::clone(&self.state));

        let addr = format!("0.0.0.0:{}", self.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!(address = %addr, "Health server started");

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown_rx.recv().await;
            })
            .await?;

        Ok(())
    }

    async fn liveness() -> impl IntoResponse {
        (StatusCode::OK, "OK")
    }

    async fn readiness(State(state): State<Arc<HealthState>>) -> impl IntoResponse {
        if state.is_ready() {
            (StatusCode::OK, "READY")
        } else {
            (StatusCode::SERVICE_UNAVAILABLE, "NOT READY")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ready_requires_chain_and_monitor() {
        let state = HealthState::new();
        assert!(state.is_ready());

        state.set_chain_healthy(false);
        assert!(!state.is_ready());

        state.set_chain_healthy(true);
        state.set_monitor_running(false);
        assert!(!state.is_ready());
    }
}
