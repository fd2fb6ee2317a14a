/// Shared application state for the webserver
///
/// Holds the hub, the publisher handed to ticket routes, and the loaded
/// configuration.
use std::sync::Arc;

use crate::config::Config;
use crate::ws::{Hub, HubPublisher, TicketPublisher};

/// Shared application state passed to all route handlers
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration
    pub config: Arc<Config>,

    /// Ticket room hub
    pub hub: Arc<Hub>,

    /// Publisher used by the event routes
    pub publisher: Arc<dyn TicketPublisher>,

    /// Server startup time
    pub startup_time: chrono::DateTime<chrono::Utc>,
}

impl AppState {
    /// Create application state with a fresh hub built from the config
    pub fn new(config: Config) -> Self {
        let hub = Hub::new(config.websocket.health_config());
        Self::with_hub(config, hub)
    }

    /// Create application state around an existing hub
    pub fn with_hub(config: Config, hub: Arc<Hub>) -> Self {
        Self {
            config: Arc::new(config),
            publisher: Arc::new(HubPublisher::new(Arc::clone(&hub))),
            hub,
            startup_time: chrono::Utc::now(),
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        (chrono::Utc::now() - self.startup_time)
            .num_seconds()
            .max(0) as u64
    }
}
