//! Room allocation
//!
//! Rooms are numbered broadcast domains. A room exists exactly while it has
//! occupants, so allocation and validation are pure reads over the registry.

use crate::client::Registry;

/// Identifies a chat room. Valid ids run from 1 through the configured
/// room bound.
pub type RoomId = u16;

/// Pick the lowest-numbered room with no occupants, or `None` when every
/// room is taken.
pub fn allocate_new_room(registry: &Registry) -> Option<RoomId> {
    (1..=registry.max_rooms()).find(|&room| registry.count_in_room(room) == 0)
}

/// A room can be joined only if its id is in range and someone already
/// occupies it; empty rooms come into being through [`allocate_new_room`].
pub fn validate_room(registry: &Registry, room: RoomId) -> bool {
    (1..=registry.max_rooms()).contains(&room) && registry.count_in_room(room) > 0
}
