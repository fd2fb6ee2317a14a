/// HTTP and WebSocket front end
///
/// Exposes the hub over axum:
/// - `GET /ws/tickets/:ticket_id` upgrades and joins `ticket:{id}`
/// - `POST /api/tickets/:ticket_id/events` publishes an event to a ticket
/// - `GET /api/ws/stats` and `GET /api/health` for monitoring
mod server;

pub mod models;
pub mod routes;
pub mod state;
pub mod utils;

// Public API for starting/stopping the webserver
pub use server::{bind, serve, shutdown, start_server};
