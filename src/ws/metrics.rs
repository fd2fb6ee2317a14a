/// Hub metrics collection
///
/// Aggregate counters for monitoring and the stats endpoint.
use serde::Serialize;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

// ============================================================================
// HUB METRICS
// ============================================================================

/// Hub-level metrics (aggregate across all connections)
#[derive(Debug, Default)]
pub struct HubMetrics {
    /// Total connections (lifetime)
    total_connections: AtomicU64,

    /// Current active connections
    active_connections: AtomicUsize,

    /// Broadcast calls that reached at least one room
    broadcasts: AtomicU64,

    /// Frames queued (one per recipient)
    frames_queued: AtomicU64,

    /// Connections evicted because their queue was full
    evictions: AtomicU64,
}

impl HubMetrics {
    /// Record new connection
    pub fn connection_opened(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Record connection closed
    pub fn connection_closed(&self) {
        // Saturate so a stray double count never wraps
        let _ = self
            .active_connections
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| n.checked_sub(1));
    }

    /// Record a broadcast and how many frames it queued
    pub fn broadcast(&self, queued: usize) {
        self.broadcasts.fetch_add(1, Ordering::Relaxed);
        self.frames_queued.fetch_add(queued as u64, Ordering::Relaxed);
    }

    /// Record evicted connections
    pub fn evicted(&self, count: usize) {
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Get snapshot
    pub fn snapshot(&self) -> HubMetricsSnapshot {
        HubMetricsSnapshot {
            total_connections: self.total_connections.load(Ordering::Relaxed),
            active_connections: self.active_connections.load(Ordering::Relaxed),
            broadcasts: self.broadcasts.load(Ordering::Relaxed),
            frames_queued: self.frames_queued.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}

/// Hub metrics snapshot
#[derive(Debug, Clone, Serialize)]
pub struct HubMetricsSnapshot {
    pub total_connections: u64,
    pub active_connections: usize,
    pub broadcasts: u64,
    pub frames_queued: u64,
    pub evictions: u64,
}
