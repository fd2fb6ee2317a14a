use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Parser;

use tickethub::{
    config,
    logger::{self, LogTag, LoggerConfig},
    webserver::{self, state::AppState},
};

#[derive(Parser, Debug)]
#[command(name = "tickethub")]
#[command(about = "Real-time ticket notification hub (WebSocket fan-out)", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, default_value = config::CONFIG_FILE_PATH)]
    config: String,

    /// Override the bind host
    #[arg(long)]
    host: Option<String>,

    /// Override the bind port
    #[arg(long)]
    port: Option<u16>,

    /// Hub (rooms, broadcast, eviction) debug mode
    #[arg(long)]
    debug_hub: bool,

    /// Connection (pumps, keep-alive, close) debug mode
    #[arg(long)]
    debug_connection: bool,

    /// Webserver (routes, upgrades) debug mode
    #[arg(long)]
    debug_webserver: bool,
}

impl Args {
    /// Debug tag keys enabled on the command line
    fn debug_tags(&self) -> Vec<&'static str> {
        [
            (self.debug_hub, LogTag::Hub),
            (self.debug_connection, LogTag::Connection),
            (self.debug_webserver, LogTag::Webserver),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .map(|(_, tag)| tag.to_debug_key())
        .collect()
    }
}

/// Main entry point for tickethub
///
/// Loads the config, starts the webserver and waits for Ctrl+C or SIGTERM.
/// On shutdown the server stops accepting, then the hub closes every
/// WebSocket connection.
#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        logger::error(LogTag::System, &format!("❌ {:#}", e));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    let mut config = config::load_config_from_path(&args.config)?;
    config
        .server
        .apply_overrides(args.host.as_deref(), args.port);
    config.validate().map_err(|e| anyhow!("Invalid configuration: {}", e))?;

    let mut debug_tags: Vec<String> = config.logging.debug_tags.clone();
    debug_tags.extend(args.debug_tags().into_iter().map(str::to_string));
    logger::init(LoggerConfig::from_names(&config.logging.level, &debug_tags));

    logger::info(LogTag::System, "🚀 tickethub starting up...");
    logger::debug(LogTag::Config, &format!("Loaded configuration: {:?}", config));

    let state = Arc::new(AppState::new(config));

    let mut server = tokio::spawn(webserver::start_server(Arc::clone(&state)));

    let outcome = tokio::select! {
        signal = wait_for_shutdown_signal() => {
            let signal_name = signal.map_err(|e| anyhow!(e))?;
            logger::warning(
                LogTag::System,
                &format!("Shutdown signal received ({})", signal_name),
            );
            webserver::shutdown();
            (&mut server).await
        }
        // Server exited on its own (bind failure or server error)
        outcome = &mut server => outcome,
    };

    outcome
        .map_err(|e| anyhow!("Webserver task failed: {}", e))?
        .map_err(|e| anyhow!(e))?;

    let stats = state.hub.stats();
    logger::info(
        LogTag::System,
        &format!(
            "Served {} connections, {} broadcasts, {} evictions",
            stats.metrics.total_connections, stats.metrics.broadcasts, stats.metrics.evictions
        ),
    );

    logger::info(LogTag::System, "✅ tickethub stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C, SIGTERM on Unix)
async fn wait_for_shutdown_signal() -> Result<&'static str, String> {
    #[cfg(unix)]
    let signal_name = {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint =
            signal(SignalKind::interrupt()).map_err(|e| format!("Failed to bind SIGINT: {}", e))?;
        let mut sigterm = signal(SignalKind::terminate())
            .map_err(|e| format!("Failed to bind SIGTERM: {}", e))?;

        tokio::select! {
            _ = sigint.recv() => "SIGINT",
            _ = sigterm.recv() => "SIGTERM",
        }
    };

    #[cfg(not(unix))]
    let signal_name = {
        tokio::signal::ctrl_c()
            .await
            .map_err(|e| format!("Failed to listen for shutdown signal: {}", e))?;
        "CTRL_C"
    };

    Ok(signal_name)
}
