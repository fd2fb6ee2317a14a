/// Topic hub - room registry and broadcaster
///
/// The Hub is the single source of truth for room membership:
/// - topic -> member connections (a topic exists only while it has members)
/// - non-blocking fan-out with enqueue-or-evict backpressure
/// - one-time, idempotent shutdown that closes every connection
///
/// Registry lock discipline: the lock is held only for map edits and for
/// snapshotting a room's members. Enqueue attempts and evictions run after it
/// is released, because closing a connection re-enters `leave`.
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use axum::extract::ws::Message;
use futures::{Sink, Stream};

use crate::errors::HubError;
use crate::logger::{self, LogTag};

use super::connection::{Connection, ConnectionId, Enqueue};
use super::event::Event;
use super::health::HealthConfig;
use super::metrics::{HubMetrics, HubMetricsSnapshot};

type Room = HashMap<ConnectionId, Arc<Connection>>;

// ============================================================================
// HUB
// ============================================================================

pub struct Hub {
    /// Rooms keyed by topic
    rooms: RwLock<HashMap<String, Room>>,

    /// Set once by `shutdown`
    shut_down: AtomicBool,

    /// Next connection ID
    next_conn_id: AtomicU64,

    /// Keep-alive timings handed to every connection
    health: HealthConfig,

    metrics: HubMetrics,
}

/// Registry and counter snapshot for the stats endpoint
#[derive(Debug, Clone, Serialize)]
pub struct HubStatsSnapshot {
    pub rooms: usize,
    pub connections: usize,
    pub shut_down: bool,
    pub metrics: HubMetricsSnapshot,
}

impl Hub {
    /// Create a new hub
    pub fn new(health: HealthConfig) -> Arc<Self> {
        Arc::new(Self {
            rooms: RwLock::new(HashMap::new()),
            shut_down: AtomicBool::new(false),
            next_conn_id: AtomicU64::new(1),
            health,
            metrics: HubMetrics::default(),
        })
    }

    pub fn health(&self) -> &HealthConfig {
        &self.health
    }

    pub fn metrics(&self) -> &HubMetrics {
        &self.metrics
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Acquire)
    }

    /// Create a connection bound to `topic` (not yet joined, pumps not started)
    pub fn new_connection(self: &Arc<Self>, topic: &str) -> Arc<Connection> {
        let id = self.next_conn_id.fetch_add(1, Ordering::Relaxed);
        self.metrics.connection_opened();
        Connection::new(id, topic.to_string(), Arc::downgrade(self), self.health)
    }

    /// Accept an upgraded socket: create the connection, join its room and
    /// start both pumps
    ///
    /// After shutdown the socket is dropped and `HubError::ShutDown` returned.
    pub fn attach<S, E>(self: &Arc<Self>, topic: &str, socket: S) -> Result<Arc<Connection>, HubError>
    where
        S: Stream<Item = Result<Message, E>> + Sink<Message, Error = E> + Send + 'static,
        E: Display + Send + 'static,
    {
        let conn = self.new_connection(topic);
        if let Err(e) = self.join(topic, &conn) {
            conn.close();
            return Err(e);
        }
        self.start_member(&conn, socket)?;
        Ok(conn)
    }

    /// Start the pumps of a joined connection
    ///
    /// Fails when shutdown closed the connection after it joined; the socket
    /// is dropped in that case.
    fn start_member<S, E>(&self, conn: &Arc<Connection>, socket: S) -> Result<(), HubError>
    where
        S: Stream<Item = Result<Message, E>> + Sink<Message, Error = E> + Send + 'static,
        E: Display + Send + 'static,
    {
        if conn.start(socket) {
            Ok(())
        } else {
            Err(HubError::ShutDown)
        }
    }

    /// Register a connection under its topic, creating the room if absent
    ///
    /// `topic` must be the one the connection was created for, since `close`
    /// leaves that room. A connection that is already closing is not
    /// registered.
    pub fn join(&self, topic: &str, conn: &Arc<Connection>) -> Result<(), HubError> {
        if topic != conn.topic() {
            return Err(HubError::TopicMismatch {
                topic: topic.to_string(),
                connection_topic: conn.topic().to_string(),
            });
        }

        let mut rooms = self.rooms.write();
        // Checked under the write lock so shutdown's clear cannot miss us
        if self.is_shut_down() {
            return Err(HubError::ShutDown);
        }
        if conn.is_closed() {
            return Ok(());
        }

        let room = rooms.entry(topic.to_string()).or_default();
        room.insert(conn.id(), Arc::clone(conn));
        let members = room.len();
        drop(rooms);

        logger::debug(
            LogTag::Hub,
            &format!("Connection {} joined {} (members={})", conn.id(), topic, members),
        );
        Ok(())
    }

    /// Remove a connection from a room, dropping the room when it empties
    ///
    /// Idempotent. Called from `Connection::close`; application code closes
    /// the connection instead of calling this.
    pub fn leave(&self, topic: &str, id: ConnectionId) {
        let mut rooms = self.rooms.write();
        let Some(room) = rooms.get_mut(topic) else {
            return;
        };
        if room.remove(&id).is_none() {
            return;
        }
        let remaining = room.len();
        if remaining == 0 {
            rooms.remove(topic);
        }
        drop(rooms);

        logger::debug(
            LogTag::Hub,
            &format!("Connection {} left {} (members={})", id, topic, remaining),
        );
    }

    /// Fan an event out to every member of `topic`
    ///
    /// The event is serialized once. Each member gets a non-blocking enqueue;
    /// members whose queue is full are closed. A topic without members is not
    /// an error. Returns how many connections the frame was queued for.
    pub fn broadcast(&self, topic: &str, event: &Event) -> Result<usize, HubError> {
        let frame = event.to_frame()?;

        if self.is_shut_down() {
            logger::debug(
                LogTag::Hub,
                &format!("Broadcast {} to {} ignored: hub shut down", event.kind(), topic),
            );
            return Ok(0);
        }

        let members: Vec<Arc<Connection>> = {
            let rooms = self.rooms.read();
            match rooms.get(topic) {
                Some(room) => room.values().cloned().collect(),
                None => return Ok(0),
            }
        };

        let mut queued = 0;
        let mut evicted = Vec::new();
        for conn in members {
            match conn.try_enqueue(Arc::clone(&frame)) {
                Enqueue::Queued => queued += 1,
                Enqueue::Full => evicted.push(conn),
                Enqueue::Closed => {}
            }
        }
        self.metrics.broadcast(queued);

        if !evicted.is_empty() {
            self.metrics.evicted(evicted.len());
            for conn in evicted {
                logger::warning(
                    LogTag::Hub,
                    &format!("Connection {} on {}: queue full, evicting", conn.id(), topic),
                );
                conn.close();
            }
        }

        // Hot path: skip formatting unless hub debug output is on
        if logger::is_debug_enabled(LogTag::Hub) {
            logger::debug(
                LogTag::Hub,
                &format!("Broadcast {} to {} (queued={})", event.kind(), topic, queued),
            );
        }
        Ok(queued)
    }

    /// Close every connection and clear the registry
    ///
    /// Runs once; later calls return 0. Completes without waiting for pumps
    /// to drain. Returns the number of connections closed.
    pub fn shutdown(&self) -> usize {
        if self
            .shut_down
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return 0;
        }

        let rooms = std::mem::take(&mut *self.rooms.write());
        let room_count = rooms.len();

        let mut closed = 0;
        for conn in rooms.into_values().flat_map(Room::into_values) {
            conn.close();
            closed += 1;
        }

        logger::info(
            LogTag::Hub,
            &format!("Hub shut down ({} connections across {} rooms closed)", closed, room_count),
        );
        closed
    }

    /// Number of rooms with at least one member
    pub fn room_count(&self) -> usize {
        self.rooms.read().len()
    }

    /// Number of registered connections across all rooms
    pub fn connection_count(&self) -> usize {
        self.rooms.read().values().map(HashMap::len).sum()
    }

    /// IDs of the connections currently in `topic`
    pub fn members(&self, topic: &str) -> Vec<ConnectionId> {
        let mut ids: Vec<ConnectionId> = self
            .rooms
            .read()
            .get(topic)
            .map(|room| room.keys().copied().collect())
            .unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    pub fn stats(&self) -> HubStatsSnapshot {
        let (rooms, connections) = {
            let rooms = self.rooms.read();
            (rooms.len(), rooms.values().map(HashMap::len).sum())
        };
        HubStatsSnapshot {
            rooms,
            connections,
            shut_down: self.is_shut_down(),
            metrics: self.metrics.snapshot(),
        }
    }
}
