use std::net::SocketAddr;
use std::sync::Arc;

use log::{error, info, warn};
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};

use crate::client::{ClientRecord, ColorTag, Registry, SharedRegistry, session};
use crate::config::ServerConfig;
use crate::error::HandshakeError;
use crate::protocol::responses;
use crate::protocol::{negotiate_room, prompt_username};
use crate::relay;

pub struct Server {
    registry: SharedRegistry,
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Bind the listening socket and set up the shared registry.
    pub async fn new(config: ServerConfig) -> Self {
        let socket = config.listen_socket();

        let listener = match TcpListener::bind(&socket).await {
            Ok(listener) => {
                info!("Server bound to {}", socket);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", socket, e);
                panic!("Server startup failed on socket {}: {}", socket, e);
            }
        };

        Self {
            registry: Registry::shared(&config),
            listener,
            config: Arc::new(config),
        }
    }

    /// Address the listener actually bound (useful with port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accept connections forever, spawning a task per client.
    pub async fn start(&self) {
        info!(
            "Starting chat server on {} (max {} clients, {} rooms)",
            self.config.listen_socket(),
            self.config.max_clients,
            self.config.max_rooms
        );

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!("New connection from {}", addr);
                    let registry = Arc::clone(&self.registry);
                    let config = Arc::clone(&self.config);

                    // Spawn a task for each client so the accept loop doesn't block
                    tokio::spawn(async move {
                        if let Err(e) = handle_new_client(stream, addr, registry, config).await {
                            warn!("Failed to handle client {}: {}", addr, e);
                        }
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                }
            }
        }
    }
}

/// Drive a new connection through the handshake, register it, announce the
/// join, and hand off to the session loop. Any exit before registration
/// leaves no trace in the registry.
async fn handle_new_client(
    stream: TcpStream,
    addr: SocketAddr,
    registry: SharedRegistry,
    config: Arc<ServerConfig>,
) -> Result<(), std::io::Error> {
    let (read_half, mut write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half);

    let room = match negotiate_room(&mut reader, &mut write_half, &registry).await {
        Ok(room) => room,
        Err(HandshakeError::Disconnected) => {
            info!("Client {} disconnected during room negotiation", addr);
            return Ok(());
        }
        Err(HandshakeError::Io(e)) => return Err(e),
        Err(e) => {
            warn!("Rejected client {}: {}", addr, e);
            return Ok(());
        }
    };

    let name =
        match prompt_username(&mut reader, &mut write_half, config.max_username_len).await {
            Ok(name) => name,
            Err(HandshakeError::Io(e)) => return Err(e),
            Err(_) => {
                info!("Client {} disconnected before naming itself", addr);
                return Ok(());
            }
        };

    let record = ClientRecord::new(addr, name.clone(), ColorTag::random(), room, write_half);
    {
        let mut reg = registry.lock().await;
        match reg.register(record) {
            Ok(()) => {
                info!(
                    "Registered {} as {:?} in room {} ({}/{} clients)",
                    addr,
                    name,
                    room,
                    reg.len(),
                    reg.capacity()
                );
            }
            Err(mut rejected) => {
                drop(reg);
                let _ = rejected.send(responses::SERVER_FULL).await;
                warn!("Turned away client {}: server is full", addr);
                return Ok(());
            }
        }
    }

    relay::announce_join(&registry, room, addr).await;
    session::run(reader, addr, room, registry, config).await;
    Ok(())
}
