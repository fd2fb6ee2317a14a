//! End-to-end tests: real axum server, real WebSocket clients

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use tickethub::config::Config;
use tickethub::webserver::{self, state::AppState};
use tickethub::ws::{kinds, Event};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const ALLOWED_ORIGIN: &str = "http://localhost:5500";

struct TestServer {
    addr: SocketAddr,
    state: Arc<AppState>,
    stop: Option<oneshot::Sender<()>>,
    handle: JoinHandle<Result<(), String>>,
}

impl TestServer {
    async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let state = Arc::new(AppState::new(Config::default()));
        let (stop, stopped) = oneshot::channel::<()>();

        let handle = tokio::spawn(webserver::serve(listener, Arc::clone(&state), async move {
            let _ = stopped.await;
        }));

        Self {
            addr,
            state,
            stop: Some(stop),
            handle,
        }
    }

    async fn connect(&self, ticket_id: i64, origin: &str) -> Result<Client, WsError> {
        let url = format!("ws://{}/ws/tickets/{}", self.addr, ticket_id);
        let mut request = url.into_client_request()?;
        request
            .headers_mut()
            .insert("Origin", HeaderValue::from_str(origin).unwrap());
        let (client, _) = connect_async(request).await?;
        Ok(client)
    }

    async fn shutdown(mut self) -> Result<(), String> {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        self.handle.await.unwrap()
    }
}

/// Poll until `condition` holds (attach runs after the upgrade completes)
async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

async fn next_text(client: &mut Client) -> String {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("no frame in time")
            .expect("stream ended")
            .expect("read error");
        match message {
            Message::Text(text) => return text,
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("unexpected frame: {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_publish_reaches_only_ticket_watchers() {
    let server = TestServer::start().await;
    let hub = Arc::clone(&server.state.hub);

    let mut a = server.connect(42, ALLOWED_ORIGIN).await.unwrap();
    let mut b = server.connect(42, ALLOWED_ORIGIN).await.unwrap();
    let mut c = server.connect(99, ALLOWED_ORIGIN).await.unwrap();
    wait_until(|| hub.members("ticket:42").len() == 2 && hub.members("ticket:99").len() == 1).await;

    let response: Value = reqwest::Client::new()
        .post(format!("http://{}/api/tickets/42/events", server.addr))
        .json(&json!({ "kind": "message_created", "payload": { "id": 7 } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(response["delivered"], 2);
    assert_eq!(response["topic"], "ticket:42");

    let expected = r#"{"kind":"message_created","payload":{"id":7}}"#;
    assert_eq!(next_text(&mut a).await, expected);
    assert_eq!(next_text(&mut b).await, expected);

    let nothing = tokio::time::timeout(Duration::from_millis(200), c.next()).await;
    assert!(nothing.is_err(), "ticket:99 watcher received a frame");

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_events_arrive_in_publish_order() {
    let server = TestServer::start().await;
    let hub = Arc::clone(&server.state.hub);

    let mut client = server.connect(5, ALLOWED_ORIGIN).await.unwrap();
    wait_until(|| hub.room_count() == 1).await;

    for id in 0..20 {
        let event = Event::new(kinds::TICKET_STATUS_CHANGED, json!({ "seq": id })).unwrap();
        assert_eq!(server.state.publisher.publish_to_ticket(5, event).unwrap(), 1);
    }

    for id in 0..20 {
        let value: Value = serde_json::from_str(&next_text(&mut client).await).unwrap();
        assert_eq!(value["kind"], "ticket_status_changed");
        assert_eq!(value["payload"]["seq"], id);
    }

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_disallowed_origin_is_rejected() {
    let server = TestServer::start().await;

    match server.connect(1, "http://evil.example").await {
        Err(WsError::Http(response)) => assert_eq!(response.status(), 403),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("upgrade accepted for a disallowed origin"),
    }
    assert_eq!(server.state.hub.room_count(), 0);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_client_close_leaves_room() {
    let server = TestServer::start().await;
    let hub = Arc::clone(&server.state.hub);

    let mut client = server.connect(8, ALLOWED_ORIGIN).await.unwrap();
    wait_until(|| hub.room_count() == 1).await;

    client.close(None).await.unwrap();
    wait_until(|| hub.room_count() == 0).await;
    assert_eq!(hub.stats().metrics.active_connections, 0);

    server.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_shutdown_closes_open_sockets() {
    let server = TestServer::start().await;
    let hub = Arc::clone(&server.state.hub);

    let mut first = server.connect(1, ALLOWED_ORIGIN).await.unwrap();
    let mut second = server.connect(2, ALLOWED_ORIGIN).await.unwrap();
    wait_until(|| hub.connection_count() == 2).await;

    server.shutdown().await.unwrap();
    assert!(hub.is_shut_down());
    assert_eq!(hub.room_count(), 0);

    for client in [&mut first, &mut second] {
        let frame = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("socket left open after shutdown");
        assert!(matches!(frame, Some(Ok(Message::Close(_))) | Some(Err(_)) | None));
    }
}

#[tokio::test]
async fn test_stats_and_health_endpoints() {
    let server = TestServer::start().await;
    let hub = Arc::clone(&server.state.hub);

    let _client = server.connect(3, ALLOWED_ORIGIN).await.unwrap();
    wait_until(|| hub.room_count() == 1).await;

    let http = reqwest::Client::new();
    let stats: Value = http
        .get(format!("http://{}/api/ws/stats", server.addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(stats["rooms"], 1);
    assert_eq!(stats["connections"], 1);
    assert_eq!(stats["metrics"]["total_connections"], 1);

    let health: Value = http
        .get(format!("http://{}/api/health", server.addr))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(health["status"], "ok");

    let bad = http
        .post(format!("http://{}/api/tickets/3/events", server.addr))
        .json(&json!({ "kind": "", "payload": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(bad.status().as_u16(), 400);

    server.shutdown().await.unwrap();
}
