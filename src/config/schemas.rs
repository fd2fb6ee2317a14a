/// Configuration schema definitions
///
/// Every section is declared with `config_struct!`, so defaults live next to
/// the field they belong to and a missing TOML key falls back to them.
use crate::config_struct;
use crate::ws::health::HealthConfig;
use std::time::Duration;

// ============================================================================
// SERVER CONFIGURATION
// ============================================================================

config_struct! {
    /// HTTP server configuration
    pub struct ServerConfig {
        host: String = "127.0.0.1".to_string(),
        port: u16 = 8080,

        /// Origins allowed to open a WebSocket (empty = any origin)
        allowed_origins: Vec<String> = vec!["http://localhost:5500".to_string()],

        /// Time allowed for in-flight HTTP requests to finish on shutdown
        shutdown_grace_secs: u64 = 5,
    }
}

// ============================================================================
// WEBSOCKET CONFIGURATION
// ============================================================================

config_struct! {
    /// WebSocket keep-alive configuration
    ///
    /// The probe period is derived as 9/10 of the read deadline.
    pub struct WebSocketConfig {
        /// Connection is dropped if no pong arrives within this window
        read_deadline_secs: u64 = 60,

        /// Upper bound for a single frame write
        write_deadline_secs: u64 = 10,

        /// Largest inbound frame accepted from a client
        max_inbound_frame_bytes: usize = 512,
    }
}

// ============================================================================
// LOGGING CONFIGURATION
// ============================================================================

config_struct! {
    /// Logging configuration
    pub struct LoggingConfig {
        level: String = "info".to_string(),

        /// Tags with debug output enabled (e.g. ["hub", "connection"])
        debug_tags: Vec<String> = Vec::new(),
    }
}

// ============================================================================
// ROOT CONFIGURATION
// ============================================================================

config_struct! {
    /// Root configuration structure containing all sub-configurations
    pub struct Config {
        server: ServerConfig = ServerConfig::default(),
        websocket: WebSocketConfig = WebSocketConfig::default(),
        logging: LoggingConfig = LoggingConfig::default(),
    }
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

impl ServerConfig {
    /// Get the full bind address (host:port)
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Apply command-line host/port overrides
    pub fn apply_overrides(&mut self, host: Option<&str>, port: Option<u16>) {
        if let Some(host) = host {
            self.host = host.to_string();
        }
        if let Some(port) = port {
            self.port = port;
        }
    }

    /// Check an Origin header against the allow-list
    pub fn is_origin_allowed(&self, origin: Option<&str>) -> bool {
        if self.allowed_origins.is_empty() {
            return true;
        }
        match origin {
            Some(origin) => self.allowed_origins.iter().any(|allowed| allowed == origin),
            None => false,
        }
    }
}

impl WebSocketConfig {
    /// Keep-alive timings for the hub
    pub fn health_config(&self) -> HealthConfig {
        HealthConfig::from_deadlines(
            Duration::from_secs(self.read_deadline_secs),
            Duration::from_secs(self.write_deadline_secs),
        )
        .with_max_inbound_frame_bytes(self.max_inbound_frame_bytes)
    }
}

impl Config {
    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.server.host.is_empty() {
            return Err("Host cannot be empty".to_string());
        }

        if self.server.port == 0 {
            return Err("Port cannot be 0".to_string());
        }

        let ws = &self.websocket;
        if ws.read_deadline_secs == 0 || ws.write_deadline_secs == 0 {
            return Err("WebSocket deadlines must be > 0".to_string());
        }
        if ws.write_deadline_secs >= ws.read_deadline_secs {
            return Err(format!(
                "WebSocket write_deadline_secs ({}) must be shorter than read_deadline_secs ({})",
                ws.write_deadline_secs, ws.read_deadline_secs
            ));
        }
        if ws.max_inbound_frame_bytes == 0 {
            return Err("WebSocket max_inbound_frame_bytes must be > 0".to_string());
        }

        Ok(())
    }
}
