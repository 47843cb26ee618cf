//! Steady-state client session
//!
//! Runs once a client is registered: read lines from the peer and relay
//! them until the peer goes away, then announce the departure and free the
//! registry slot. EOF and read errors are the ordinary way a session ends
//! and are never escalated to anyone else.

use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;

use crate::client::SharedRegistry;
use crate::config::ServerConfig;
use crate::relay;
use crate::rooms::RoomId;

/// Read-and-relay loop for one registered client.
pub async fn run(
    mut reader: BufReader<OwnedReadHalf>,
    addr: SocketAddr,
    room: RoomId,
    registry: SharedRegistry,
    config: Arc<ServerConfig>,
) {
    let mut line = String::new();
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => {
                info!("Connection closed by client {}", addr);
                break;
            }
            Ok(_) => {
                let text: String = line
                    .trim_end_matches(['\r', '\n'])
                    .chars()
                    .take(config.max_message_len)
                    .collect();
                relay::chat(&registry, room, addr, &text).await;
            }
            Err(e) => {
                error!("Failed to read from {}: {}", addr, e);
                break;
            }
        }
    }

    relay::announce_leave(&registry, room, addr).await;
    registry.lock().await.deregister(&addr);
    info!("Client {} disconnected", addr);
}
