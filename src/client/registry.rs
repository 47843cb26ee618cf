//! Client registry
//!
//! The shared table of registered clients, keyed by peer address and bounded
//! by the configured client limit. Every read or write of the table happens
//! while holding the single registry lock, including the whole of a
//! broadcast fan-out and its eviction sweep.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use log::info;
use tokio::sync::Mutex;

use crate::client::ClientRecord;
use crate::config::ServerConfig;
use crate::rooms::RoomId;

/// Registry handle shared across connection tasks behind one lock.
pub type SharedRegistry = Arc<Mutex<Registry>>;

/// Bounded table of registered clients.
pub struct Registry {
    clients: HashMap<SocketAddr, ClientRecord>,
    max_clients: usize,
    max_rooms: RoomId,
}

impl Registry {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            clients: HashMap::with_capacity(config.max_clients),
            max_clients: config.max_clients,
            max_rooms: config.max_rooms,
        }
    }

    /// Wrap a fresh registry for sharing across tasks.
    pub fn shared(config: &ServerConfig) -> SharedRegistry {
        Arc::new(Mutex::new(Self::new(config)))
    }

    /// Insert a record, rejecting when the table is full.
    ///
    /// On rejection the record is handed back so the caller can still reach
    /// the peer to explain before closing.
    pub fn register(&mut self, record: ClientRecord) -> Result<(), ClientRecord> {
        if self.clients.len() >= self.max_clients {
            return Err(record);
        }
        self.clients.insert(record.addr(), record);
        self.log_roster();
        Ok(())
    }

    /// Remove the record registered for this peer address, if any.
    pub fn deregister(&mut self, addr: &SocketAddr) -> Option<ClientRecord> {
        let removed = self.clients.remove(addr);
        if removed.is_some() {
            self.log_roster();
        }
        removed
    }

    pub fn get(&self, addr: &SocketAddr) -> Option<&ClientRecord> {
        self.clients.get(addr)
    }

    /// Every live record currently in the room.
    pub fn members_mut(&mut self, room: RoomId) -> impl Iterator<Item = &mut ClientRecord> {
        self.clients
            .values_mut()
            .filter(move |record| record.room() == room && record.is_live())
    }

    /// Live occupancy of one room.
    pub fn count_in_room(&self, room: RoomId) -> usize {
        self.clients
            .values()
            .filter(|record| record.room() == room && record.is_live())
            .count()
    }

    /// Occupied rooms in ascending id order with their live head counts.
    pub fn occupied_rooms(&self) -> Vec<(RoomId, usize)> {
        (1..=self.max_rooms)
            .filter_map(|room| {
                let count = self.count_in_room(room);
                (count > 0).then_some((room, count))
            })
            .collect()
    }

    /// Remove every record marked dead during a fan-out, returning them so
    /// the caller can log the eviction. Dropping a returned record closes
    /// its write half.
    pub fn sweep(&mut self) -> Vec<ClientRecord> {
        let dead: Vec<SocketAddr> = self
            .clients
            .values()
            .filter(|record| !record.is_live())
            .map(|record| record.addr())
            .collect();

        let mut evicted = Vec::with_capacity(dead.len());
        for addr in dead {
            if let Some(record) = self.clients.remove(&addr) {
                evicted.push(record);
            }
        }
        if !evicted.is_empty() {
            self.log_roster();
        }
        evicted
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_clients
    }

    pub fn max_rooms(&self) -> RoomId {
        self.max_rooms
    }

    fn log_roster(&self) {
        let names: Vec<&str> = self.clients.values().map(|record| record.name()).collect();
        info!("Connected users: {}", names.join(" "));
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::net::SocketAddr;

    use tokio::net::tcp::OwnedReadHalf;
    use tokio::net::{TcpListener, TcpStream};

    use crate::client::{ClientRecord, ColorTag};
    use crate::config::ServerConfig;
    use crate::rooms::RoomId;

    /// A record backed by a real loopback socket, plus the peer end of the
    /// connection and the parked server-side read half.
    pub(crate) struct RecordFixture {
        pub(crate) record: ClientRecord,
        pub(crate) peer: TcpStream,
        pub(crate) _read_half: OwnedReadHalf,
    }

    impl RecordFixture {
        pub(crate) fn addr(&self) -> SocketAddr {
            self.record.addr()
        }
    }

    pub(crate) async fn record(name: &str, room: RoomId) -> RecordFixture {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let peer = TcpStream::connect(addr).await.unwrap();
        let (server_side, _) = listener.accept().await.unwrap();
        let peer_addr = server_side.peer_addr().unwrap();
        let (read_half, write_half) = server_side.into_split();

        RecordFixture {
            record: ClientRecord::new(
                peer_addr,
                name.to_string(),
                ColorTag::random(),
                room,
                write_half,
            ),
            peer,
            _read_half: read_half,
        }
    }

    pub(crate) fn small_config(max_clients: usize, max_rooms: RoomId) -> ServerConfig {
        ServerConfig {
            max_clients,
            max_rooms,
            ..ServerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::AsyncReadExt;

    use super::test_support::{record, small_config};
    use super::*;

    #[tokio::test]
    async fn test_register_and_deregister() {
        let mut registry = Registry::new(&small_config(4, 3));
        let alice = record("alice", 1).await;
        let alice_addr = alice.addr();

        assert!(registry.register(alice.record).is_ok());
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.count_in_room(1), 1);
        assert!(registry.get(&alice_addr).is_some());

        assert!(registry.deregister(&alice_addr).is_some());
        assert!(registry.is_empty());
        assert!(registry.deregister(&alice_addr).is_none());
    }

    #[tokio::test]
    async fn test_capacity_rejection_hands_the_record_back() {
        let mut registry = Registry::new(&small_config(1, 3));
        let alice = record("alice", 1).await;
        let bob = record("bob", 1).await;
        let bob_addr = bob.addr();

        assert!(registry.register(alice.record).is_ok());
        let rejected = registry.register(bob.record).unwrap_err();
        assert_eq!(rejected.addr(), bob_addr);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test]
    async fn test_counts_ignore_dead_records() {
        let mut registry = Registry::new(&small_config(4, 3));
        let alice = record("alice", 1).await;
        let bob = record("bob", 1).await;
        let bob_addr = bob.addr();

        registry.register(alice.record).unwrap();
        registry.register(bob.record).unwrap();
        assert_eq!(registry.count_in_room(1), 2);

        for member in registry.members_mut(1) {
            if member.addr() == bob_addr {
                member.mark_dead();
            }
        }

        assert_eq!(registry.count_in_room(1), 1);
        assert_eq!(registry.occupied_rooms(), vec![(1, 1)]);
    }

    #[tokio::test]
    async fn test_sweep_removes_dead_records_and_closes_them() {
        let mut registry = Registry::new(&small_config(4, 3));
        let alice = record("alice", 1).await;
        let mut bob = record("bob", 1).await;
        let carol = record("carol", 1).await;
        let bob_addr = bob.addr();

        registry.register(alice.record).unwrap();
        registry.register(bob.record).unwrap();
        registry.register(carol.record).unwrap();

        for member in registry.members_mut(1) {
            if member.addr() == bob_addr {
                member.mark_dead();
            }
        }

        let evicted = registry.sweep();
        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].name(), "bob");
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.count_in_room(1), 2);

        // Dropping the evicted record shuts the write half down, so bob's
        // peer sees end of stream.
        drop(evicted);
        let mut buf = [0u8; 8];
        let n = bob.peer.read(&mut buf).await.unwrap();
        assert_eq!(n, 0);
    }

    #[tokio::test]
    async fn test_occupied_rooms_ascend_by_id() {
        let mut registry = Registry::new(&small_config(4, 5));
        let alice = record("alice", 3).await;
        let bob = record("bob", 1).await;

        registry.register(alice.record).unwrap();
        registry.register(bob.record).unwrap();

        assert_eq!(registry.occupied_rooms(), vec![(1, 1), (3, 1)]);
    }
}
