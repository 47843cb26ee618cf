//! Room and username handshake
//!
//! The exchange every connection completes before it may chat: resolve a
//! room (directly, via the menu, or auto-assigned), then collect a display
//! name. Nothing is registered until the whole exchange succeeds, so a peer
//! that vanishes here never appears in occupancy counts or broadcasts.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::client::SharedRegistry;
use crate::error::HandshakeError;
use crate::protocol::responses;
use crate::rooms::{self, RoomId};

/// A room request parsed from one line of client input.
#[derive(Debug, PartialEq)]
pub enum RoomRequest {
    New,
    Join(RoomId),
}

/// Parse a request line into a room request. Returns `None` for anything
/// that is neither `new` nor a room number.
pub fn parse_room_request(line: &str) -> Option<RoomRequest> {
    let token = line.trim();
    if token.eq_ignore_ascii_case("new") {
        return Some(RoomRequest::New);
    }
    token.parse::<RoomId>().ok().map(RoomRequest::Join)
}

/// Run the room-selection half of the handshake.
///
/// On success the peer has been sent a confirmation for the returned room.
/// On rejection the matching error line has already been written and the
/// caller should close the connection.
pub async fn negotiate_room<R, W>(
    reader: &mut R,
    writer: &mut W,
    registry: &SharedRegistry,
) -> Result<RoomId, HandshakeError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let Some(first) = read_request_line(reader).await? else {
        return Err(HandshakeError::Disconnected);
    };

    let request = if first.trim().is_empty() {
        let open = registry.lock().await.occupied_rooms();
        if open.is_empty() {
            // Nothing to choose from yet, start the first room.
            RoomRequest::New
        } else {
            writer
                .write_all(responses::room_menu(&open).as_bytes())
                .await?;
            let Some(answer) = read_request_line(reader).await? else {
                return Err(HandshakeError::Disconnected);
            };
            parse_or_reject(answer, writer).await?
        }
    } else {
        parse_or_reject(first, writer).await?
    };

    let (room, is_new) = match request {
        RoomRequest::New => {
            let reg = registry.lock().await;
            match rooms::allocate_new_room(&reg) {
                Some(room) => (room, true),
                None => {
                    drop(reg);
                    writer
                        .write_all(responses::NO_ROOMS_AVAILABLE.as_bytes())
                        .await?;
                    return Err(HandshakeError::NoRoomsAvailable);
                }
            }
        }
        RoomRequest::Join(room) => {
            let reg = registry.lock().await;
            if rooms::validate_room(&reg, room) {
                (room, false)
            } else {
                drop(reg);
                writer.write_all(responses::INVALID_ROOM.as_bytes()).await?;
                return Err(HandshakeError::InvalidRoom(room.to_string()));
            }
        }
    };

    writer
        .write_all(responses::room_confirmation(room, is_new).as_bytes())
        .await?;
    Ok(room)
}

/// Prompt for and read the display name.
///
/// Empty input falls back to the placeholder; over-long input is truncated.
pub async fn prompt_username<R, W>(
    reader: &mut R,
    writer: &mut W,
    max_len: usize,
) -> Result<String, HandshakeError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    writer
        .write_all(responses::USERNAME_PROMPT.as_bytes())
        .await?;

    let Some(line) = read_request_line(reader).await? else {
        return Err(HandshakeError::Disconnected);
    };

    let name = name_from_line(&line, max_len);
    Ok(name)
}

fn name_from_line(line: &str, max_len: usize) -> String {
    let name = line.trim();
    if name.is_empty() {
        responses::DEFAULT_USERNAME.to_string()
    } else {
        name.chars().take(max_len).collect()
    }
}

/// Read one line, stripping the terminator. `None` means the peer is gone.
async fn read_request_line<R>(reader: &mut R) -> Result<Option<String>, HandshakeError>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let n = reader.read_line(&mut line).await?;
    if n == 0 {
        return Ok(None);
    }
    while line.ends_with('\n') || line.ends_with('\r') {
        line.pop();
    }
    Ok(Some(line))
}

async fn parse_or_reject<W>(token: String, writer: &mut W) -> Result<RoomRequest, HandshakeError>
where
    W: AsyncWrite + Unpin,
{
    match parse_room_request(&token) {
        Some(request) => Ok(request),
        None => {
            writer.write_all(responses::INVALID_ROOM.as_bytes()).await?;
            Err(HandshakeError::InvalidRoom(token))
        }
    }
}
