use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Response,
    routing::post,
    Json, Router,
};

use crate::logger::{self, LogTag};
use crate::webserver::models::{PublishEventRequest, PublishEventResponse};
use crate::webserver::state::AppState;
use crate::webserver::utils::{error_response, success_response};
use crate::ws::{ticket_topic, Event};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/tickets/:ticket_id/events", post(publish_ticket_event))
}

/// Publish an event to everyone watching a ticket
async fn publish_ticket_event(
    Path(ticket_id): Path<i64>,
    State(state): State<Arc<AppState>>,
    Json(request): Json<PublishEventRequest>,
) -> Response {
    if request.kind.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "INVALID_KIND",
            "Event kind cannot be empty",
            None,
        );
    }

    let kind = request.kind.clone();
    let event = Event::from_value(request.kind, request.payload);

    match state.publisher.publish_to_ticket(ticket_id, event) {
        Ok(delivered) => {
            logger::debug(
                LogTag::Webserver,
                &format!(
                    "Published {} to ticket {} via API (delivered={})",
                    kind, ticket_id, delivered
                ),
            );
            success_response(PublishEventResponse {
                topic: ticket_topic(ticket_id),
                kind,
                delivered,
            })
        }
        Err(e) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "PUBLISH_FAILED",
            "Failed to publish event",
            Some(&e.to_string()),
        ),
    }
}
