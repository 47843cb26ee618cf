//! Error types
//!
//! Domain errors for the pre-chat handshake. Failures after registration
//! never become errors: a failed delivery marks the target record dead and
//! a failed read ends only the session that saw it.

use std::fmt;
use std::io;

/// Ways a handshake can end before a client is registered.
#[derive(Debug)]
pub enum HandshakeError {
    /// Peer closed the connection mid-handshake.
    Disconnected,
    /// Peer asked for a room that cannot be parsed or joined.
    InvalidRoom(String),
    /// Peer asked for a new room while every room is occupied.
    NoRoomsAvailable,
    /// Reading from or writing to the peer failed.
    Io(io::Error),
}

impl fmt::Display for HandshakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandshakeError::Disconnected => write!(f, "client disconnected during handshake"),
            HandshakeError::InvalidRoom(token) => write!(f, "invalid room request: {:?}", token),
            HandshakeError::NoRoomsAvailable => write!(f, "no rooms available"),
            HandshakeError::Io(e) => write!(f, "handshake I/O error: {}", e),
        }
    }
}

impl std::error::Error for HandshakeError {}

impl From<io::Error> for HandshakeError {
    fn from(error: io::Error) -> Self {
        HandshakeError::Io(error)
    }
}
