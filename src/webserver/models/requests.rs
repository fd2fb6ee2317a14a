use serde::Deserialize;

/// Body of `POST /api/tickets/:ticket_id/events`
///
/// Same shape as the wire envelope; `payload` defaults to `null`.
#[derive(Debug, Clone, Deserialize)]
pub struct PublishEventRequest {
    pub kind: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}
