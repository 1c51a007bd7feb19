//! UNO WebSocket game server - Entry Point
//!
//! Starts the TCP listener and lobby actor, accepting connections.

use std::env;

use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use uno_server::{handle_connection, Lobby, RoomConfig};

/// Default server address
const DEFAULT_ADDR: &str = "127.0.0.1:8080";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging with environment filter
    // Use RUST_LOG env var to control log level
    // e.g., RUST_LOG=debug or RUST_LOG=uno_server=trace
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("uno_server=info")),
        )
        .init();

    // Get bind address from command line or use default
    let addr = env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_ADDR.to_string());

    // Capacity bounds from UNO_MIN_PLAYERS / UNO_MAX_PLAYERS
    let config = RoomConfig::from_env();
    info!(
        "Room capacity: {}-{} players",
        config.min_players, config.max_players
    );

    // Start TCP listener
    let listener = TcpListener::bind(&addr).await?;
    info!("UNO game server listening on {}", addr);

    // Start the lobby actor; rooms are spawned on demand
    let lobby = Lobby::spawn(config);

    // Connection accept loop
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                info!("New connection from {}", addr);
                let lobby = lobby.clone();

                // Spawn handler task for each connection
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, lobby).await {
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
