use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ws::HubStatsSnapshot;

/// Generic error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Result of publishing an event to a ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishEventResponse {
    pub topic: String,
    pub kind: String,
    /// Connections the event was queued for
    pub delivered: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct WsStatsResponse {
    #[serde(flatten)]
    pub hub: HubStatsSnapshot,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_seconds: u64,
    pub version: String,
}
