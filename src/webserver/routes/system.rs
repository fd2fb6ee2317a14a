use std::sync::Arc;

use axum::{extract::State, response::Response, routing::get, Router};

use crate::webserver::models::{HealthResponse, WsStatsResponse};
use crate::webserver::state::AppState;
use crate::webserver::utils::success_response;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health))
        .route("/ws/stats", get(ws_stats))
}

async fn health(State(state): State<Arc<AppState>>) -> Response {
    let status = if state.hub.is_shut_down() {
        "shutting_down"
    } else {
        "ok"
    };
    success_response(HealthResponse {
        status: status.to_string(),
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Room and connection counters
async fn ws_stats(State(state): State<Arc<AppState>>) -> Response {
    success_response(WsStatsResponse {
        hub: state.hub.stats(),
        timestamp: chrono::Utc::now(),
    })
}
