//! In-memory duplex transport for exercising connection pumps without a network
use axum::extract::ws::Message;
use futures::channel::mpsc::{unbounded, UnboundedReceiver, UnboundedSender};
use futures::{Sink, Stream, StreamExt};
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Server side of the pair, handed to `Hub::attach`
pub struct MockSocket {
    incoming: UnboundedReceiver<Result<Message, io::Error>>,
    outgoing: UnboundedSender<Message>,
    /// Writes never become ready (peer stopped reading)
    stalled: bool,
}

/// Client side of the pair, driven by the test
pub struct MockPeer {
    to_server: UnboundedSender<Result<Message, io::Error>>,
    from_server: UnboundedReceiver<Message>,
}

/// What the peer observed from the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerEvent {
    Text(String),
    Binary(Vec<u8>),
    Ping,
    Pong,
    Close,
    /// Server dropped its write half
    Ended,
}

pub fn duplex() -> (MockSocket, MockPeer) {
    pair(false)
}

/// Like `duplex`, but every server write stays pending forever
pub fn stalled_duplex() -> (MockSocket, MockPeer) {
    pair(true)
}

fn pair(stalled: bool) -> (MockSocket, MockPeer) {
    let (to_server, incoming) = unbounded();
    let (outgoing, from_server) = unbounded();
    (
        MockSocket {
            incoming,
            outgoing,
            stalled,
        },
        MockPeer {
            to_server,
            from_server,
        },
    )
}

impl MockPeer {
    /// Send a frame to the server
    pub fn send(&self, message: Message) {
        let _ = self.to_server.unbounded_send(Ok(message));
    }

    /// Make the server's next read fail
    pub fn fail_read(&self, reason: &str) {
        let _ = self
            .to_server
            .unbounded_send(Err(io::Error::new(io::ErrorKind::ConnectionReset, reason.to_string())));
    }

    /// Next frame written by the server
    pub async fn next_event(&mut self) -> PeerEvent {
        match self.from_server.next().await {
            Some(Message::Text(text)) => PeerEvent::Text(text),
            Some(Message::Binary(data)) => PeerEvent::Binary(data),
            Some(Message::Ping(_)) => PeerEvent::Ping,
            Some(Message::Pong(_)) => PeerEvent::Pong,
            Some(Message::Close(_)) => PeerEvent::Close,
            None => PeerEvent::Ended,
        }
    }
}

fn broken_pipe<E: std::fmt::Display>(e: E) -> io::Error {
    io::Error::new(io::ErrorKind::BrokenPipe, e.to_string())
}

impl Stream for MockSocket {
    type Item = Result<Message, io::Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.incoming).poll_next(cx)
    }
}

impl Sink<Message> for MockSocket {
    type Error = io::Error;

    fn poll_ready(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        if self.stalled {
            return Poll::Pending;
        }
        Pin::new(&mut self.outgoing).poll_ready(cx).map_err(broken_pipe)
    }

    fn start_send(mut self: Pin<&mut Self>, item: Message) -> Result<(), Self::Error> {
        Pin::new(&mut self.outgoing).start_send(item).map_err(broken_pipe)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Pin::new(&mut self.outgoing).poll_flush(cx).map_err(broken_pipe)
    }

    fn poll_close(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Pin::new(&mut self.outgoing).poll_close(cx).map_err(broken_pipe)
    }
}
