//! Client record and presentation tag
//!
//! Defines the per-client state kept in the registry while a peer is
//! allowed to chat.

use std::net::SocketAddr;

use rand::Rng;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;

use crate::rooms::RoomId;

/// ANSI foreground palette bounds (red through white).
const PALETTE_FIRST: u8 = 31;
const PALETTE_LAST: u8 = 37;

/// Presentation tag assigned to a client once at registration.
///
/// The tag is carried opaquely with the record and only interpreted when a
/// line is formatted for the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorTag(u8);

impl ColorTag {
    /// Draw a tag uniformly at random from the palette.
    pub fn random() -> Self {
        Self(rand::thread_rng().gen_range(PALETTE_FIRST..=PALETTE_LAST))
    }

    /// The ANSI color code this tag maps to.
    pub fn code(self) -> u8 {
        self.0
    }
}

/// State of one registered chat client.
///
/// The session task keeps the read half of the connection; the record owns
/// the write half so broadcasts can reach the peer. Identity is the peer
/// address — display names are not unique.
#[derive(Debug)]
pub struct ClientRecord {
    addr: SocketAddr,
    name: String,
    color: ColorTag,
    room: RoomId,
    live: bool,
    writer: OwnedWriteHalf,
}

impl ClientRecord {
    pub fn new(
        addr: SocketAddr,
        name: String,
        color: ColorTag,
        room: RoomId,
        writer: OwnedWriteHalf,
    ) -> Self {
        Self {
            addr,
            name,
            color,
            room,
            live: true,
            writer,
        }
    }

    /// Peer address, the record's identity in the registry.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Display name chosen during the handshake.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Presentation tag chosen at registration.
    pub fn color(&self) -> ColorTag {
        self.color
    }

    /// Room this record belongs to, fixed for its lifetime.
    pub fn room(&self) -> RoomId {
        self.room
    }

    /// Whether the record is still a valid delivery target.
    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Flag the record for eviction on the next sweep.
    pub fn mark_dead(&mut self) {
        self.live = false;
    }

    /// Write one already-formatted line to the peer.
    pub async fn send(&mut self, line: &str) -> std::io::Result<()> {
        self.writer.write_all(line.as_bytes()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_tag_stays_within_palette() {
        for _ in 0..100 {
            let tag = ColorTag::random();
            assert!((PALETTE_FIRST..=PALETTE_LAST).contains(&tag.code()));
        }
    }
}
