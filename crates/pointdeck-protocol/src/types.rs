//! Room and participant state as it appears on the wire.
//!
//! These snapshots are embedded in [`ServerEvent`](crate::ServerEvent)
//! payloads. Field names are camelCase in JSON to match what the web
//! client stores and renders.

use serde::{Deserialize, Serialize};

use crate::{RoomId, UserId};

/// A participant in a planning room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique within the room (invariant held by the room store).
    pub id: UserId,

    /// Display name chosen by the participant.
    pub name: String,

    /// Optional avatar icon.
    pub icon: Option<String>,

    /// Whether this participant may reveal and reset.
    pub is_host: bool,

    /// The participant's current estimate.
    ///
    /// `None` means "no vote": a participant who never voted and one who
    /// voted an explicit null are the same state. Cleared by reset.
    pub card_value: Option<f64>,
}

/// A shared planning session: participants plus reveal state.
///
/// `users` keeps insertion order — clients render participants in the
/// order they joined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,

    /// Always the id of exactly one entry in `users` while the room is
    /// live. Reassigned when the original host rejoins after a drop.
    pub host_id: UserId,

    pub users: Vec<User>,

    /// Toggled only by explicit reveal/reset, never implicitly.
    pub revealed: bool,
}

impl Room {
    /// Looks up a participant by id.
    pub fn user(&self, id: &UserId) -> Option<&User> {
        self.users.iter().find(|u| &u.id == id)
    }

    /// Looks up a participant by id, mutably.
    pub fn user_mut(&mut self, id: &UserId) -> Option<&mut User> {
        self.users.iter_mut().find(|u| &u.id == id)
    }
}
