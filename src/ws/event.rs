/// Notification event envelope
///
/// Wire format is a single text frame holding exactly two fields:
/// `{"kind": "<discriminator>", "payload": <any JSON value>}`
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::errors::HubError;

/// A serialized event as queued for delivery
///
/// Shared between every recipient of one broadcast.
pub type Frame = Arc<str>;

/// Event kinds published by the ticket services
pub mod kinds {
    pub const MESSAGE_CREATED: &str = "message_created";
    pub const TICKET_STATUS_CHANGED: &str = "ticket_status_changed";
    pub const TICKET_ASSIGNED: &str = "ticket_assigned";
}

/// Immutable notification envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    kind: String,
    payload: serde_json::Value,
}

impl Event {
    /// Build an event from any serializable payload
    pub fn new(kind: impl Into<String>, payload: impl Serialize) -> Result<Self, HubError> {
        Ok(Self {
            kind: kind.into(),
            payload: serde_json::to_value(payload)?,
        })
    }

    /// Build an event from an already-constructed JSON value
    pub fn from_value(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            payload,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn payload(&self) -> &serde_json::Value {
        &self.payload
    }

    /// Serialize into a wire frame
    pub fn to_frame(&self) -> Result<Frame, HubError> {
        Ok(Arc::from(serde_json::to_string(self)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Serialize)]
    struct Message {
        id: u64,
        content: &'static str,
    }

    #[test]
    fn test_wire_format() {
        let event = Event::from_value(kinds::MESSAGE_CREATED, json!({"id": 7}));
        let frame = event.to_frame().unwrap();
        assert_eq!(&*frame, r#"{"kind":"message_created","payload":{"id":7}}"#);

        let decoded: Event = serde_json::from_str(&frame).unwrap();
        assert_eq!(decoded, event);
    }

    #[test]
    fn test_typed_payload() {
        let event = Event::new(kinds::MESSAGE_CREATED, Message { id: 3, content: "hi" }).unwrap();
        assert_eq!(event.kind(), "message_created");
        assert_eq!(event.payload(), &json!({"id": 3, "content": "hi"}));
    }

    #[test]
    fn test_unserializable_payload() {
        use std::collections::HashMap;

        // JSON object keys must be strings
        let mut payload = HashMap::new();
        payload.insert(vec![1u8], "x");
        let err = Event::new("broken", payload).unwrap_err();
        assert!(matches!(err, HubError::Serialization(_)));
    }
}
