use thiserror::Error;

/// Errors surfaced by the notification hub.
///
/// Only `Serialization`, `ShutDown` and `TopicMismatch` reach a caller. The
/// transport variants describe why a single connection was torn down and are
/// logged by its pumps, never propagated.
#[derive(Error, Debug)]
pub enum HubError {
    #[error("Serialization error: {0}")] Serialization(#[from] serde_json::Error),

    #[error("Hub is shut down")] ShutDown,

    #[error("Connection for '{connection_topic}' cannot join '{topic}'")] TopicMismatch {
        topic: String,
        connection_topic: String,
    },

    #[error("Transport error: {0}")] Transport(String),

    #[error("Read deadline expired after {seconds}s without a pong")] ReadTimeout {
        seconds: u64,
    },

    #[error("Write deadline expired after {seconds}s")] WriteTimeout {
        seconds: u64,
    },

    #[error("Inbound frame too large: {size} bytes > {limit} bytes")] FrameTooLarge {
        size: usize,
        limit: usize,
    },
}

impl HubError {
    /// Whether this error only affects one connection (closed, never reported to callers)
    pub fn is_connection_fatal(&self) -> bool {
        matches!(
            self,
            HubError::Transport(_)
                | HubError::ReadTimeout { .. }
                | HubError::WriteTimeout { .. }
                | HubError::FrameTooLarge { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(HubError::Transport("reset".into()).is_connection_fatal());
        assert!(HubError::ReadTimeout { seconds: 60 }.is_connection_fatal());
        assert!(HubError::FrameTooLarge { size: 600, limit: 512 }.is_connection_fatal());
        assert!(!HubError::ShutDown.is_connection_fatal());
        assert!(!HubError::TopicMismatch {
            topic: "ticket:1".into(),
            connection_topic: "ticket:2".into(),
        }
        .is_connection_fatal());

        let err = HubError::FrameTooLarge { size: 600, limit: 512 };
        assert_eq!(err.to_string(), "Inbound frame too large: 600 bytes > 512 bytes");
    }
}
