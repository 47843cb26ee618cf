//! Parlor Chat Server
//!
//! A TCP chat service: clients pick a numbered room through a short
//! handshake, then every line they send is relayed to the other members of
//! their room.

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod relay;
pub mod rooms;
pub mod server;

pub use config::ServerConfig;
pub use server::Server;
