/// Ticket WebSocket Hub Module
///
/// In-process pub/sub: every client watching a ticket joins the room
/// `ticket:{id}`, and domain events published for that ticket fan out to all
/// of them.
///
/// ## Architecture
/// - One room per topic, created on first join and dropped on last leave
/// - Events serialized once per broadcast and shared across recipients
/// - Per-connection bounded queues; a full queue evicts the connection
/// - Keep-alive probing with read and write deadlines
///
/// ## Key Components
/// - `hub`: Room registry, broadcast and shutdown
/// - `connection`: Per-client queue, pumps and idempotent close
/// - `event`: Wire envelope `{"kind", "payload"}`
/// - `publisher`: Ticket id -> topic mapping for domain code
/// - `health`: Keep-alive timings
/// - `metrics`: Hub-wide counters
pub mod connection;
pub mod event;
pub mod health;
pub mod hub;
pub mod metrics;
pub mod publisher;

#[cfg(test)]
pub(crate) mod testing;

pub use connection::{Connection, ConnectionId, ConnectionState, Enqueue};
pub use event::{kinds, Event, Frame};
pub use health::HealthConfig;
pub use hub::{Hub, HubStatsSnapshot};
pub use publisher::{ticket_topic, HubPublisher, TicketPublisher};
