/// WebSocket connection lifecycle
///
/// Each connection owns a bounded outbound queue and runs two tasks for its
/// whole life:
/// - the inbound pump reads from the peer under a deadline that only a pong
///   extends, and discards application payloads
/// - the outbound pump drains the queue and sends keep-alive probes
///
/// `close()` is the single teardown path for every trigger (read failure,
/// write failure, queue overflow, hub shutdown). It runs exactly once.
///
/// State machine: `Open -> Closing -> Closed`. `Closed` is reached once the
/// teardown has finished and both pumps (if they were started) have exited.
use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use parking_lot::Mutex;
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::{mpsc, watch};
use tokio::time::{interval_at, timeout, timeout_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::errors::HubError;
use crate::logger::{self, LogTag};

use super::event::Frame;
use super::health::HealthConfig;
use super::hub::Hub;

/// Outbound queue capacity per connection
pub const SEND_QUEUE_CAPACITY: usize = 256;

/// Connection ID (unique per hub)
pub type ConnectionId = u64;

// ============================================================================
// CONNECTION TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Pumps running, queue accepts frames
    Open,
    /// Teardown started; enqueues fail harmlessly
    Closing,
    /// Teardown finished and both pumps exited
    Closed,
}

/// Outcome of a non-blocking enqueue attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueue {
    Queued,
    /// Queue at capacity; the connection is too slow and should be evicted
    Full,
    /// Connection already closing; the frame goes nowhere
    Closed,
}

// ============================================================================
// CONNECTION
// ============================================================================

pub struct Connection {
    id: ConnectionId,
    topic: String,
    hub: Weak<Hub>,
    health: HealthConfig,

    /// Producer side of the outbound queue; taken on close
    sender: Mutex<Option<mpsc::Sender<Frame>>>,

    /// Consumer side, parked here until the outbound pump takes it
    receiver: Mutex<Option<mpsc::Receiver<Frame>>>,

    /// Close guard (set by the one `close()` call that performs teardown)
    close_started: AtomicBool,
    close_finished: AtomicBool,

    /// Cancelled on close; both pumps stop and drop their socket halves
    cancel: CancellationToken,

    pumps_running: AtomicUsize,
    state: watch::Sender<ConnectionState>,

    frames_sent: AtomicU64,
    probes_sent: AtomicU64,
}

impl Connection {
    pub(crate) fn new(
        id: ConnectionId,
        topic: String,
        hub: Weak<Hub>,
        health: HealthConfig,
    ) -> Arc<Self> {
        let (tx, rx) = mpsc::channel(SEND_QUEUE_CAPACITY);
        let (state, _) = watch::channel(ConnectionState::Open);

        Arc::new(Self {
            id,
            topic,
            hub,
            health,
            sender: Mutex::new(Some(tx)),
            receiver: Mutex::new(Some(rx)),
            close_started: AtomicBool::new(false),
            close_finished: AtomicBool::new(false),
            cancel: CancellationToken::new(),
            pumps_running: AtomicUsize::new(0),
            state,
            frames_sent: AtomicU64::new(0),
            probes_sent: AtomicU64::new(0),
        })
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Whether teardown has started
    pub fn is_closed(&self) -> bool {
        self.close_started.load(Ordering::Acquire)
    }

    /// Frames written to the peer so far
    pub fn frames_sent(&self) -> u64 {
        self.frames_sent.load(Ordering::Relaxed)
    }

    /// Keep-alive probes written to the peer so far
    pub fn probes_sent(&self) -> u64 {
        self.probes_sent.load(Ordering::Relaxed)
    }

    /// Try to queue a frame without waiting
    pub fn try_enqueue(&self, frame: Frame) -> Enqueue {
        let sender = self.sender.lock();
        let Some(tx) = sender.as_ref() else {
            return Enqueue::Closed;
        };
        match tx.try_send(frame) {
            Ok(()) => Enqueue::Queued,
            Err(mpsc::error::TrySendError::Full(_)) => Enqueue::Full,
            Err(mpsc::error::TrySendError::Closed(_)) => Enqueue::Closed,
        }
    }

    /// Start the inbound and outbound pumps on an established socket
    ///
    /// Returns `false` if the pumps were already started or the connection is
    /// closed; the socket is dropped in that case.
    pub fn start<S, E>(self: &Arc<Self>, socket: S) -> bool
    where
        S: Stream<Item = Result<Message, E>> + Sink<Message, Error = E> + Send + 'static,
        E: Display + Send + 'static,
    {
        let queue = {
            let mut receiver = self.receiver.lock();
            let Some(queue) = receiver.take() else {
                return false;
            };
            // Counted while the receiver lock is held so close() sees the pumps
            self.pumps_running.store(2, Ordering::Release);
            queue
        };

        let (sink, stream) = socket.split();
        tokio::spawn(Arc::clone(self).run_outbound_pump(sink, queue));
        tokio::spawn(Arc::clone(self).run_inbound_pump(stream));

        logger::debug(
            LogTag::Connection,
            &format!("Connection {} started on {}", self.id, self.topic),
        );
        true
    }

    /// Read loop: keeps the read deadline alive and detects dead peers
    ///
    /// Application payloads are discarded; only pongs reset the deadline.
    async fn run_inbound_pump<R, E>(self: Arc<Self>, mut stream: R)
    where
        R: Stream<Item = Result<Message, E>> + Unpin,
        E: Display,
    {
        let read_deadline = self.health.read_deadline;
        let limit = self.health.max_inbound_frame_bytes;
        let mut deadline = Instant::now() + read_deadline;

        let result: Result<(), HubError> = loop {
            let next = tokio::select! {
                _ = self.cancel.cancelled() => break Ok(()),
                next = timeout_at(deadline, stream.next()) => next,
            };

            let message = match next {
                Err(_) => {
                    break Err(HubError::ReadTimeout {
                        seconds: read_deadline.as_secs(),
                    })
                }
                Ok(None) => break Ok(()),
                Ok(Some(Err(e))) => break Err(HubError::Transport(e.to_string())),
                Ok(Some(Ok(message))) => message,
            };

            match message {
                Message::Pong(_) => deadline = Instant::now() + read_deadline,
                Message::Close(_) => break Ok(()),
                // Pings are answered by the transport
                Message::Ping(_) => {}
                Message::Text(text) if text.len() > limit => {
                    break Err(HubError::FrameTooLarge {
                        size: text.len(),
                        limit,
                    })
                }
                Message::Binary(data) if data.len() > limit => {
                    break Err(HubError::FrameTooLarge {
                        size: data.len(),
                        limit,
                    })
                }
                Message::Text(_) | Message::Binary(_) => {}
            }
        };

        self.log_pump_exit("inbound", &result);
        drop(stream);
        self.close();
        self.pump_exited();
    }

    /// Write loop: delivers queued frames in order and probes the peer
    async fn run_outbound_pump<W, E>(self: Arc<Self>, mut sink: W, mut queue: mpsc::Receiver<Frame>)
    where
        W: Sink<Message, Error = E> + Unpin,
        E: Display,
    {
        let period = self.health.ping_period;
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let result: Result<(), HubError> = loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => {
                    let _ = self.write(&mut sink, Message::Close(None)).await;
                    break Ok(());
                }

                frame = queue.recv() => {
                    let Some(frame) = frame else {
                        let _ = self.write(&mut sink, Message::Close(None)).await;
                        break Ok(());
                    };
                    if let Err(e) = self.write(&mut sink, Message::Text(frame.to_string())).await {
                        break Err(e);
                    }
                    self.frames_sent.fetch_add(1, Ordering::Relaxed);
                }

                _ = ticker.tick() => {
                    if let Err(e) = self.write(&mut sink, Message::Ping(Vec::new())).await {
                        break Err(e);
                    }
                    self.probes_sent.fetch_add(1, Ordering::Relaxed);
                }
            }
        };

        self.log_pump_exit("outbound", &result);
        drop(queue);
        drop(sink);
        self.close();
        self.pump_exited();
    }

    /// Write one message under the write deadline
    async fn write<W, E>(&self, sink: &mut W, message: Message) -> Result<(), HubError>
    where
        W: Sink<Message, Error = E> + Unpin,
        E: Display,
    {
        match timeout(self.health.write_deadline, sink.send(message)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(HubError::Transport(e.to_string())),
            Err(_) => Err(HubError::WriteTimeout {
                seconds: self.health.write_deadline.as_secs(),
            }),
        }
    }

    /// Tear the connection down; only the first call has any effect
    ///
    /// Order: leave the hub, close the socket (cancel both pumps), close the
    /// outbound queue. Never blocks, so it is safe from either pump, from a
    /// broadcaster evicting this connection, and from hub shutdown.
    pub fn close(&self) {
        if self
            .close_started
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        self.state.send_replace(ConnectionState::Closing);

        if let Some(hub) = self.hub.upgrade() {
            hub.leave(&self.topic, self.id);
            hub.metrics().connection_closed();
        }

        self.cancel.cancel();
        self.sender.lock().take();
        self.receiver.lock().take();

        logger::debug(
            LogTag::Connection,
            &format!(
                "Connection {} closed (topic={}, sent={}, probes={})",
                self.id,
                self.topic,
                self.frames_sent(),
                self.probes_sent()
            ),
        );

        self.close_finished.store(true, Ordering::Release);
        self.try_mark_closed();
    }

    /// Wait until the connection reaches `Closed`
    pub async fn wait_closed(&self) {
        let mut state = self.state.subscribe();
        let _ = state
            .wait_for(|state| *state == ConnectionState::Closed)
            .await;
    }

    fn pump_exited(&self) {
        self.pumps_running.fetch_sub(1, Ordering::AcqRel);
        self.try_mark_closed();
    }

    fn try_mark_closed(&self) {
        if self.close_finished.load(Ordering::Acquire)
            && self.pumps_running.load(Ordering::Acquire) == 0
        {
            self.state.send_if_modified(|state| {
                if *state == ConnectionState::Closing {
                    *state = ConnectionState::Closed;
                    true
                } else {
                    false
                }
            });
        }
    }

    fn log_pump_exit(&self, pump: &str, result: &Result<(), HubError>) {
        match result {
            Ok(()) => logger::debug(
                LogTag::Connection,
                &format!("Connection {}: {} pump finished", self.id, pump),
            ),
            Err(e) if e.is_connection_fatal() => logger::warning(
                LogTag::Connection,
                &format!("Connection {}: {} pump failed: {}", self.id, pump, e),
            ),
            Err(e) => logger::error(
                LogTag::Connection,
                &format!("Connection {}: {} pump stopped unexpectedly: {}", self.id, pump, e),
            ),
        }
    }

    /// Drain frames still sitting in an unstarted connection's queue
    #[cfg(test)]
    pub(crate) fn drain_queued(&self) -> Vec<Frame> {
        let mut frames = Vec::new();
        if let Some(rx) = self.receiver.lock().as_mut() {
            while let Ok(frame) = rx.try_recv() {
                frames.push(frame);
            }
        }
        frames
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("topic", &self.topic)
            .field("state", &self.state())
            .finish()
    }
}
