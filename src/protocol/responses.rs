//! Wire text
//!
//! Every line the server writes to a client is produced here. Server output
//! is newline-terminated throughout so clients can frame purely by lines.

use crate::client::ColorTag;
use crate::rooms::RoomId;

/// Prompt sent once a room is assigned.
pub const USERNAME_PROMPT: &str = "Type username:\n";

/// Display name for clients that offer none.
pub const DEFAULT_USERNAME: &str = "anonymous";

pub const INVALID_ROOM: &str = "Invalid room number\n";
pub const NO_ROOMS_AVAILABLE: &str = "No rooms available\n";
pub const SERVER_FULL: &str = "Server is full, try again later\n";

/// Menu of currently occupied rooms with their head counts.
pub fn room_menu(rooms: &[(RoomId, usize)]) -> String {
    let mut menu = String::from("Currently open rooms:\n");
    for (room, count) in rooms {
        menu.push_str(&format!("Room {}: {} people\n", room, count));
    }
    menu.push_str("Pick a room number or type new:\n");
    menu
}

/// Confirmation naming the room a client ended up in.
pub fn room_confirmation(room: RoomId, is_new: bool) -> String {
    if is_new {
        format!("Connected to room number {} (new)\n", room)
    } else {
        format!("Connected to room number {}\n", room)
    }
}

/// A chat line: bold-colored sender name, then the text verbatim, with
/// exactly one trailing newline.
pub fn chat_line(name: &str, color: ColorTag, text: &str) -> String {
    format!("\x1b[1;{}m[{}]\x1b[0m: {}\n", color.code(), name, text)
}

/// A system announcement, colored whole-line with the subject's tag.
pub fn notice_line(color: ColorTag, text: &str) -> String {
    format!("\x1b[1;{}m{}\x1b[0m\n", color.code(), text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_menu_lists_rooms_in_given_order() {
        let menu = room_menu(&[(1, 2), (4, 1)]);
        assert!(menu.starts_with("Currently open rooms:\n"));
        assert!(menu.contains("Room 1: 2 people\n"));
        assert!(menu.contains("Room 4: 1 people\n"));
        assert!(menu.ends_with("Pick a room number or type new:\n"));
    }

    #[test]
    fn test_room_confirmation_marks_fresh_rooms() {
        assert_eq!(room_confirmation(1, true), "Connected to room number 1 (new)\n");
        assert_eq!(room_confirmation(3, false), "Connected to room number 3\n");
    }

    #[test]
    fn test_chat_line_has_exactly_one_terminator() {
        let color = ColorTag::random();
        let line = chat_line("bob", color, "hello");
        assert!(line.ends_with('\n'));
        assert!(!line[..line.len() - 1].contains('\n'));
        assert!(line.contains("[bob]"));
        assert!(line.contains("hello"));
        assert!(line.starts_with(&format!("\x1b[1;{}m", color.code())));
    }

    #[test]
    fn test_notice_line_is_colored_whole_line() {
        let color = ColorTag::random();
        let line = notice_line(color, "alice joined room 1");
        assert_eq!(
            line,
            format!("\x1b[1;{}malice joined room 1\x1b[0m\n", color.code())
        );
    }
}
