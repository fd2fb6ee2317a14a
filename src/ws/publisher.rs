/// Ticket event publisher
///
/// The seam between domain code (message creation, status changes,
/// assignment) and the hub. Domain code depends on `TicketPublisher` only, so
/// it never sees rooms or connections.
use std::sync::Arc;

use crate::errors::HubError;
use crate::logger::{self, LogTag};

use super::event::Event;
use super::hub::Hub;

/// Room topic for a ticket: `"ticket:{id}"`
pub fn ticket_topic(ticket_id: i64) -> String {
    format!("ticket:{}", ticket_id)
}

/// Publishes ticket events to whoever is watching the ticket
pub trait TicketPublisher: Send + Sync {
    /// Broadcast `event` to the ticket's room
    ///
    /// Returns how many connections the event was queued for (0 when nobody
    /// is watching). Fails only if the event cannot be serialized.
    fn publish_to_ticket(&self, ticket_id: i64, event: Event) -> Result<usize, HubError>;
}

/// `TicketPublisher` backed by a `Hub`
#[derive(Clone)]
pub struct HubPublisher {
    hub: Arc<Hub>,
}

impl HubPublisher {
    pub fn new(hub: Arc<Hub>) -> Self {
        Self { hub }
    }
}

impl TicketPublisher for HubPublisher {
    fn publish_to_ticket(&self, ticket_id: i64, event: Event) -> Result<usize, HubError> {
        let topic = ticket_topic(ticket_id);
        match self.hub.broadcast(&topic, &event) {
            Ok(queued) => Ok(queued),
            Err(e) => {
                logger::error(
                    LogTag::Hub,
                    &format!("Failed to publish {} to {}: {}", event.kind(), topic, e),
                );
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ws::event::kinds;
    use crate::ws::health::HealthConfig;
    use serde_json::json;

    #[test]
    fn test_ticket_topic_format() {
        assert_eq!(ticket_topic(42), "ticket:42");
        assert_eq!(ticket_topic(0), "ticket:0");
        assert_eq!(ticket_topic(-3), "ticket:-3");
    }

    #[tokio::test]
    async fn test_publish_routes_to_ticket_room_only() {
        let hub = Hub::new(HealthConfig::default());
        let publisher = HubPublisher::new(Arc::clone(&hub));

        let a = hub.new_connection("ticket:42");
        let b = hub.new_connection("ticket:42");
        let c = hub.new_connection("ticket:99");
        for conn in [&a, &b, &c] {
            hub.join(conn.topic(), conn).unwrap();
        }

        let event = Event::from_value(kinds::MESSAGE_CREATED, json!({ "id": 7, "ticket_id": 42 }));
        assert_eq!(publisher.publish_to_ticket(42, event).unwrap(), 2);

        let expected = r#"{"kind":"message_created","payload":{"id":7,"ticket_id":42}}"#;
        assert_eq!(&*a.drain_queued()[0], expected);
        assert_eq!(&*b.drain_queued()[0], expected);
        assert!(c.drain_queued().is_empty());
    }

    #[tokio::test]
    async fn test_publish_without_watchers() {
        let hub = Hub::new(HealthConfig::default());
        let publisher = HubPublisher::new(hub);

        let event = Event::from_value(kinds::TICKET_ASSIGNED, json!({ "assignee_id": 3 }));
        assert_eq!(publisher.publish_to_ticket(7, event).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_publish_after_shutdown_is_noop() {
        let hub = Hub::new(HealthConfig::default());
        let publisher: Arc<dyn TicketPublisher> = Arc::new(HubPublisher::new(Arc::clone(&hub)));
        hub.shutdown();

        let event = Event::from_value(kinds::TICKET_STATUS_CHANGED, json!({ "status": "closed" }));
        assert_eq!(publisher.publish_to_ticket(1, event).unwrap(), 0);
    }
}
