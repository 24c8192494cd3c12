//! Status HTTP server for the live sync session
//!
//! Exposes liveness/readiness probes, the current `SyncState` as JSON for a
//! dashboard, and a Prometheus metrics endpoint.

use crate::sync::{SyncState, SyncStatus};
use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::CorsLayer;
use tracing::info;

/// Shared state for the status server
pub struct StatusState {
    /// When the server started
    pub started_at: DateTime<Utc>,
    /// Published sync state
    pub sync: watch::Receiver<SyncState>,
}

impl StatusState {
    pub fn new(sync: watch::Receiver<SyncState>) -> Self {
        Self {
            started_at: Utc::now(),
            sync,
        }
    }

    pub fn snapshot(&self) -> SyncState {
        self.sync.borrow().clone()
    }

    /// Ready once a refresh has succeeded and the last one did not fail
    pub fn is_ready(&self) -> bool {
        let state = self.sync.borrow();
        state.last_updated_at.is_some() && state.status != SyncStatus::Error
    }

    pub fn uptime_seconds(&self) -> u64 {
        (Utc::now() - self.started_at).num_seconds().max(0) as u64
    }
}

/// Status server
pub struct StatusServer {
    state: Arc<StatusState>,
    port: u16,
}

impl StatusServer {
    pub fn new(state: Arc<StatusState>, port: u16) -> Self {
        Self { state, port }
    }

    /// Start the status server
    pub async fn run(&self) -> crate::Result<()> {
        let app = router(Arc::clone(&self.state));

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Starting status server on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app)
            .await
            .map_err(|e| crate::EdgewatchError::Internal(format!("Status server error: {}", e)))?;

        Ok(())
    }
}

pub fn router(state: Arc<StatusState>) -> Router {
    Router::new()
        .route("/healthz", get(liveness_handler))
        .route("/readyz", get(readiness_handler))
        .route("/state", get(state_handler))
        .route("/metrics", get(metrics_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe - is the process alive?
async fn liveness_handler() -> impl IntoResponse {
    StatusCode::OK
}

/// Readiness probe - do we have fresh data to serve?
async fn readiness_handler(State(state): State<Arc<StatusState>>) -> impl IntoResponse {
    if state.is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// Current sync state for dashboard consumers
async fn state_handler(State(state): State<Arc<StatusState>>) -> impl IntoResponse {
    Json(state.snapshot())
}

/// Prometheus metrics endpoint
async fn metrics_handler(State(state): State<Arc<StatusState>>) -> impl IntoResponse {
    let sync = state.snapshot();
    let up = match sync.status {
        SyncStatus::Ok => 1,
        SyncStatus::Idle | SyncStatus::Loading => 0,
        SyncStatus::Error => -1,
    };
    let last_update = sync
        .last_updated_at
        .map(|t| t.timestamp())
        .unwrap_or(0);

    let metrics = format!(
        r#"# HELP edgewatch_up Sync status (1=ok, 0=idle/loading, -1=error)
# TYPE edgewatch_up gauge
edgewatch_up {}

# HELP edgewatch_uptime_seconds Uptime in seconds
# TYPE edgewatch_uptime_seconds counter
edgewatch_uptime_seconds {}

# HELP edgewatch_value_bets Value bets in the current snapshot
# TYPE edgewatch_value_bets gauge
edgewatch_value_bets {}

# HELP edgewatch_value_bets_new Value bets first seen in the last refresh
# TYPE edgewatch_value_bets_new gauge
edgewatch_value_bets_new {}

# HELP edgewatch_consecutive_failures Current consecutive refresh failures
# TYPE edgewatch_consecutive_failures gauge
edgewatch_consecutive_failures {}

# HELP edgewatch_backoff_ms Delay before the next refresh attempt
# TYPE edgewatch_backoff_ms gauge
edgewatch_backoff_ms {}

# HELP edgewatch_last_update_timestamp_seconds Time of the last successful refresh
# TYPE edgewatch_last_update_timestamp_seconds gauge
edgewatch_last_update_timestamp_seconds {}
"#,
        up,
        state.uptime_seconds(),
        sync.records.len(),
        sync.new_count(),
        sync.consecutive_failures,
        sync.current_backoff_ms,
        last_update,
    );

    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; charset=utf-8",
        )],
        metrics,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_before_first_success() {
        let (_tx, rx) = watch::channel(SyncState::initial(None, 15_000));
        let state = StatusState::new(rx);
        assert!(!state.is_ready());
    }

    #[test]
    fn test_ready_tracks_status() {
        let (tx, rx) = watch::channel(SyncState::initial(None, 15_000));
        let state = StatusState::new(rx);

        tx.send_modify(|s| {
            s.status = SyncStatus::Ok;
            s.last_updated_at = Some(Utc::now());
        });
        assert!(state.is_ready());

        tx.send_modify(|s| s.status = SyncStatus::Error);
        assert!(!state.is_ready());
    }
}
