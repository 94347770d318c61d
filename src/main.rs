//! Screen Sharing Signaling Server - Entry Point
//!
//! Starts the TCP listener and SignalServer actor, accepting connections.

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use screenshare_signal::{handle_connection, Rooms, ServerConfig, SignalServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=screenshare_signal=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("screenshare_signal=info")),
        )
        .init();

    // Arguments override SCREENSHARE_* environment variables
    let config = ServerConfig::parse();

    // Start TCP listener
    let listener = TcpListener::bind(&config.addr).await?;
    info!("Screen share signaling server listening on {}", config.addr);

    // Create SignalServer actor channel and start
    let (cmd_tx, cmd_rx) = mpsc::channel(config.channel_buffer);
    let server = SignalServer::new(Rooms::new(config.ice_servers()), cmd_rx);
    tokio::spawn(server.run());

    info!("SignalServer actor started");

    // Connection accept loop
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let cmd_tx = cmd_tx.clone();
                let write_timeout = config.write_timeout();

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, cmd_tx, write_timeout).await {
                        error!("Connection handler error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}
