//! Parlor Chat Server - Entry Point
//!
//! A line-oriented TCP chat server that groups clients into numbered rooms
//! and relays each line to the other members of the sender's room.

use log::{error, info};

use parlor_chat_server::{Server, ServerConfig};

#[tokio::main]
async fn main() {
    // Initialize the logger (env_logger picks up RUST_LOG environment variable)
    env_logger::init();

    info!("Launching chat server...");

    let config = match ServerConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let server = Server::new(config).await;
    server.start().await;
}
