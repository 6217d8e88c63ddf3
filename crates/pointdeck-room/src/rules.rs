//! Pure queries over room state.

use pointdeck_protocol::Room;

/// Returns `true` iff the room is revealed, has at least one
/// participant, and every participant's vote is set and equal.
///
/// A room where anyone never voted is not unanimous; a revealed room
/// with a single voter trivially is. This is a pure query — the caller
/// decides whether to surface a notification.
pub fn is_unanimous(room: &Room) -> bool {
    if !room.revealed {
        return false;
    }
    let Some(first) = room.users.first() else {
        return false;
    };
    let Some(value) = first.card_value else {
        return false;
    };
    room.users.iter().all(|u| u.card_value == Some(value))
}
