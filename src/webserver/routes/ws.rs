/// Ticket WebSocket endpoint
///
/// `GET /ws/tickets/:ticket_id` upgrades the request and registers the socket
/// in the ticket's room. Clients only listen: anything they send besides
/// pongs is discarded.
use std::sync::Arc;

use axum::{
    extract::{ws::WebSocketUpgrade, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    routing::get,
    Router,
};

use crate::{
    logger::{self, LogTag},
    webserver::{state::AppState, utils::error_response},
    ws::ticket_topic,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/ws/tickets/:ticket_id", get(ticket_ws_handler))
}

/// Upgrade handler for one ticket's room
pub async fn ticket_ws_handler(
    ws: WebSocketUpgrade,
    Path(ticket_id): Path<i64>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok());
    if !state.config.server.is_origin_allowed(origin) {
        logger::warning(
            LogTag::Webserver,
            &format!(
                "Rejected WebSocket for ticket {}: origin {:?} not allowed",
                ticket_id, origin
            ),
        );
        return error_response(
            StatusCode::FORBIDDEN,
            "ORIGIN_NOT_ALLOWED",
            "Origin not allowed",
            origin,
        );
    }

    if state.hub.is_shut_down() {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "SHUTTING_DOWN",
            "Server is shutting down",
            None,
        );
    }

    let topic = ticket_topic(ticket_id);
    let max_inbound = state.config.websocket.max_inbound_frame_bytes;

    ws.max_message_size(max_inbound)
        .on_upgrade(move |socket| async move {
            match state.hub.attach(&topic, socket) {
                Ok(conn) => logger::debug(
                    LogTag::Webserver,
                    &format!("WebSocket connection {} opened on {}", conn.id(), topic),
                ),
                Err(e) => logger::warning(
                    LogTag::Webserver,
                    &format!("WebSocket on {} dropped: {}", topic, e),
                ),
            }
        })
}
