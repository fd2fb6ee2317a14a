/// Axum webserver implementation
///
/// Server lifecycle: bind, serve until the shutdown signal, stop accepting,
/// then shut the hub down so every open WebSocket is closed.
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::Lazy;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::{
    config::ServerConfig,
    logger::{self, LogTag},
    webserver::{routes, state::AppState},
};

/// Global shutdown notifier
static SHUTDOWN_NOTIFY: Lazy<Arc<Notify>> = Lazy::new(|| Arc::new(Notify::new()));

/// Bind the listener described by the server config
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, String> {
    let addr: SocketAddr = config
        .bind_address()
        .parse()
        .map_err(|e| format!("Invalid bind address: {}", e))?;

    TcpListener::bind(&addr).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::AddrInUse => format!(
            "Failed to bind to {}: Address already in use\n\
             \n\
             Another process (possibly another tickethub instance) holds the port.\n\
             Stop it or choose a different port with --port.",
            addr
        ),
        std::io::ErrorKind::PermissionDenied => format!(
            "Failed to bind to {}: Permission denied\n\
             \n\
             Port {} requires elevated privileges on this system.\n\
             Consider using a port above 1024.",
            addr, config.port
        ),
        _ => format!("Failed to bind to {}: {}", addr, e),
    })
}

/// Start the webserver on the configured address
///
/// This function blocks until `shutdown()` is called.
pub async fn start_server(state: Arc<AppState>) -> Result<(), String> {
    logger::debug(
        LogTag::Webserver,
        &format!("Starting webserver on {}", state.config.server.bind_address()),
    );

    let listener = bind(&state.config.server).await?;
    serve(listener, state, async {
        SHUTDOWN_NOTIFY.notified().await;
    })
    .await
}

/// Serve on an already-bound listener until `shutdown_signal` resolves
///
/// Once the signal fires the listener stops accepting and the hub is shut
/// down. In-flight HTTP requests get `shutdown_grace_secs` to finish.
pub async fn serve<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown_signal: F,
) -> Result<(), String>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .map_err(|e| format!("Failed to read listener address: {}", e))?;
    let grace = Duration::from_secs(state.config.server.shutdown_grace_secs);

    let app = routes::create_router(Arc::clone(&state));

    logger::info(
        LogTag::Webserver,
        &format!("✅ Webserver listening on http://{}", addr),
    );
    logger::debug(
        LogTag::Webserver,
        &format!("WebSocket endpoint: ws://{}/ws/tickets/:ticket_id", addr),
    );

    let stopping = Arc::new(Notify::new());
    let graceful = {
        let stopping = Arc::clone(&stopping);
        let hub = Arc::clone(&state.hub);
        async move {
            shutdown_signal.await;
            logger::info(
                LogTag::Webserver,
                "Received shutdown signal, stopping webserver...",
            );
            stopping.notify_one();
            hub.shutdown();
        }
    };

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(graceful)
        .into_future();

    tokio::select! {
        result = server => {
            result.map_err(|e| format!("Server error: {}", e))?;
        }
        _ = async {
            stopping.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            logger::warning(
                LogTag::Webserver,
                &format!(
                    "Shutdown grace period ({}s) expired, abandoning in-flight requests",
                    grace.as_secs()
                ),
            );
        }
    }

    // No-op when the signal already did it
    state.hub.shutdown();

    logger::info(LogTag::Webserver, "✅ Webserver stopped");
    Ok(())
}

/// Trigger webserver shutdown
pub fn shutdown() {
    logger::debug(LogTag::Webserver, "Triggering webserver shutdown...");
    SHUTDOWN_NOTIFY.notify_one();
}
