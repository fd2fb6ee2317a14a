/// WebSocket keep-alive timing
///
/// The outbound pump probes the peer every `ping_period`; the inbound pump
/// drops the connection if no pong arrives within `read_deadline`. The probe
/// period must stay strictly shorter than the read deadline so a live peer's
/// pong always lands before the deadline expires.
use std::time::Duration;

/// Default read deadline (no pong within this window closes the connection)
pub const READ_DEADLINE: Duration = Duration::from_secs(60);

/// Default write deadline for a single frame
pub const WRITE_DEADLINE: Duration = Duration::from_secs(10);

/// Default cap on inbound frame size (clients only send control traffic)
pub const MAX_INBOUND_FRAME_BYTES: usize = 512;

// ============================================================================
// HEALTH CONFIG
// ============================================================================

/// Keep-alive configuration shared by every connection of a hub
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthConfig {
    /// Inbound deadline, reset on every pong
    pub read_deadline: Duration,

    /// Interval between keep-alive probes (9/10 of the read deadline)
    pub ping_period: Duration,

    /// Deadline for each outbound write
    pub write_deadline: Duration,

    /// Largest accepted inbound frame
    pub max_inbound_frame_bytes: usize,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self::from_deadlines(READ_DEADLINE, WRITE_DEADLINE)
    }
}

impl HealthConfig {
    /// Derive the probe period from the read deadline
    pub fn from_deadlines(read_deadline: Duration, write_deadline: Duration) -> Self {
        Self {
            read_deadline,
            ping_period: ping_period_for(read_deadline),
            write_deadline,
            max_inbound_frame_bytes: MAX_INBOUND_FRAME_BYTES,
        }
    }

    pub fn with_max_inbound_frame_bytes(mut self, limit: usize) -> Self {
        self.max_inbound_frame_bytes = limit;
        self
    }
}

/// Probe period for a given read deadline (9/10 of it)
pub fn ping_period_for(read_deadline: Duration) -> Duration {
    read_deadline * 9 / 10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_period_shorter_than_read_deadline() {
        let config = HealthConfig::default();
        assert_eq!(config.ping_period, Duration::from_secs(54));
        assert!(config.ping_period < config.read_deadline);
        assert!(config.write_deadline < config.read_deadline);

        let fast = HealthConfig::from_deadlines(Duration::from_millis(200), Duration::from_millis(50));
        assert_eq!(fast.ping_period, Duration::from_millis(180));
    }
}
