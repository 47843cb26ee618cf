//! Chat wire protocol
//!
//! The handshake state machine and every piece of text the server puts on
//! the wire.

pub mod handshake;
pub mod responses;

pub use handshake::{RoomRequest, negotiate_room, parse_room_request, prompt_username};
