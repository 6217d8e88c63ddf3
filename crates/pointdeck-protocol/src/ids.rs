//! Opaque identifiers for rooms, users, and connections.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Formats random bytes as a lowercase hex string.
fn random_hex<const N: usize>() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; N] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// A unique identifier for a planning room.
///
/// Generated as 6 random bytes (12 hex chars) — short enough to share
/// as a link, with a collision probability that is negligible for the
/// expected number of concurrent rooms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub String);

impl RoomId {
    /// Generates a fresh random room id.
    pub fn generate() -> Self {
        Self(random_hex::<6>())
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room-{}", self.0)
    }
}

/// A unique identifier for a room participant.
///
/// 16 random bytes (32 hex chars). The host's user id doubles as the
/// reconnection credential — a client that presents it during the grace
/// window regains host status — so it carries full 128-bit entropy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    /// Generates a fresh random user id.
    pub fn generate() -> Self {
        Self(random_hex::<16>())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user-{}", self.0)
    }
}

/// Opaque identifier for a live connection.
///
/// Assigned by the transport when a socket is accepted; never reused
/// within a process lifetime. This is the key the identity map uses to
/// answer "which room/user does this connection currently speak for."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}
