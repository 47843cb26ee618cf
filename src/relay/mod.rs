//! Broadcast engine
//!
//! Formats lines and fans them out to the members of a room. Delivery and
//! eviction of failed targets share one registry lock acquisition, so a dead
//! record is never observable half-removed and a failed peer is closed
//! before the broadcast that killed it returns.

use std::net::SocketAddr;

use log::{debug, info, warn};

use crate::client::{Registry, SharedRegistry};
use crate::protocol::responses;
use crate::rooms::RoomId;

/// Relay a chat line from a registered sender to the rest of its room.
///
/// The line is dropped silently when the sender is no longer registered
/// (evicted mid-session).
pub async fn chat(registry: &SharedRegistry, room: RoomId, sender: SocketAddr, text: &str) {
    let mut reg = registry.lock().await;
    let Some(record) = reg.get(&sender) else {
        return;
    };
    let line = responses::chat_line(record.name(), record.color(), text);
    debug!("Relaying {} bytes from {} to room {}", line.len(), sender, room);
    deliver(&mut reg, room, sender, &line).await;
}

/// Announce a newly registered client to its room.
pub async fn announce_join(registry: &SharedRegistry, room: RoomId, subject: SocketAddr) {
    announce(registry, room, subject, "joined").await;
}

/// Announce a departing client to its room.
pub async fn announce_leave(registry: &SharedRegistry, room: RoomId, subject: SocketAddr) {
    announce(registry, room, subject, "left").await;
}

async fn announce(registry: &SharedRegistry, room: RoomId, subject: SocketAddr, verb: &str) {
    let mut reg = registry.lock().await;
    let Some(record) = reg.get(&subject) else {
        return;
    };
    let text = format!("{} {} room {}", record.name(), verb, room);
    let line = responses::notice_line(record.color(), &text);
    deliver(&mut reg, room, subject, &line).await;
}

/// Write `line` to every live member of `room` except `exclude`, flagging
/// failed targets and evicting them before the lock is released. A failed
/// write never interrupts delivery to the remaining members.
async fn deliver(registry: &mut Registry, room: RoomId, exclude: SocketAddr, line: &str) {
    for record in registry.members_mut(room) {
        if record.addr() == exclude {
            continue;
        }
        if let Err(e) = record.send(line).await {
            warn!("Dropping client {} ({}): {}", record.name(), record.addr(), e);
            record.mark_dead();
        }
    }
    for evicted in registry.sweep() {
        info!("Evicted client {} ({})", evicted.name(), evicted.addr());
    }
}
