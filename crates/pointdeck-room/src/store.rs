//! The room store: all live rooms plus the connection identity map.
//!
//! # Concurrency note
//!
//! `RoomStore` is NOT thread-safe by itself — it uses plain `HashMap`s.
//! This is intentional: the gateway owns the store behind one
//! `tokio::sync::Mutex` (shared with the disband scheduler), so every
//! mutation sequence runs to completion under that lock and no partial
//! state is ever observable. Keeping the store synchronous makes its
//! rules trivially testable.

use std::collections::HashMap;

use pointdeck_protocol::{ConnectionId, Room, RoomId, User, UserId};

use crate::RoomError;

/// The (room, user) pair a connection currently speaks for.
///
/// A weak association: it does not own the room or the user, and it is
/// removed in the same mutation step that removes either of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionBinding {
    pub room_id: RoomId,
    pub user_id: UserId,
}

/// Result of removing a user from their room.
#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    /// Snapshot of the room after the user was removed.
    pub room: Room,
    /// Whether the removed user held host status. The caller uses this
    /// to decide whether to arm the grace-period disband.
    pub was_host: bool,
}

/// Result of rejoining a room during (or after) a host disconnect.
#[derive(Debug, Clone)]
pub struct RejoinOutcome {
    pub room: Room,
    /// The freshly minted identity for the rejoining connection.
    pub user_id: UserId,
    /// `true` iff the claimed previous identity matched the room's
    /// current host, so the caller must cancel any pending disband.
    pub host_restored: bool,
}

/// All live rooms, keyed by room id, plus the identity map from
/// connections to (room, user) pairs.
///
/// Invariants held by every operation:
/// - a room's `users` never contains two entries with the same id;
/// - exactly one user per non-empty room has `is_host = true`;
/// - a binding always points at a room/user pair that exist here.
#[derive(Default)]
pub struct RoomStore {
    rooms: HashMap<RoomId, Room>,
    bindings: HashMap<ConnectionId, ConnectionBinding>,
}

impl RoomStore {
    /// Creates a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a room with the caller as host and binds the connection.
    pub fn create_room(
        &mut self,
        conn: ConnectionId,
        name: impl Into<String>,
        icon: Option<String>,
    ) -> Room {
        let room_id = RoomId::generate();
        let user_id = UserId::generate();

        let host = User {
            id: user_id.clone(),
            name: name.into(),
            icon,
            is_host: true,
            card_value: None,
        };

        let room = Room {
            id: room_id.clone(),
            host_id: user_id.clone(),
            users: vec![host],
            revealed: false,
        };

        self.rooms.insert(room_id.clone(), room.clone());
        self.bindings
            .insert(conn, ConnectionBinding { room_id: room_id.clone(), user_id });

        tracing::info!(%room_id, %conn, "room created");
        room
    }

    /// Adds a non-host participant to an existing room and binds the
    /// connection.
    ///
    /// # Errors
    /// Returns [`RoomError::RoomNotFound`] if the room id is unknown.
    pub fn join_room(
        &mut self,
        conn: ConnectionId,
        room_id: &RoomId,
        name: impl Into<String>,
        icon: Option<String>,
    ) -> Result<(Room, UserId), RoomError> {
        let room = self
            .rooms
            .get_mut(room_id)
            .ok_or_else(|| RoomError::RoomNotFound(room_id.clone()))?;

        let user_id = UserId::generate();
        room.users.push(User {
            id: user_id.clone(),
            name: name.into(),
            icon,
            is_host: false,
            card_value: None,
        });

        self.bindings.insert(
            conn,
            ConnectionBinding {
                room_id: room_id.clone(),
                user_id: user_id.clone(),
            },
        );

        tracing::info!(%room_id, %conn, users = room.users.len(), "user joined");
        Ok((room.clone(), user_id))
    }

    /// Rejoins a room, possibly restoring host status.
    ///
    /// Returns `None` (an expected outcome, not an error) if the room no
    /// longer exists. If `previous_user_id` matches the room's current
    /// host id the new identity is promoted to host and `host_id` is
    /// reassigned; the old host record is not resurrected. Any other
    /// identity joins as a plain participant, even during the grace
    /// window.
    pub fn rejoin_room(
        &mut self,
        conn: ConnectionId,
        room_id: &RoomId,
        name: impl Into<String>,
        icon: Option<String>,
        previous_user_id: Option<&UserId>,
    ) -> Option<RejoinOutcome> {
        let room = self.rooms.get_mut(room_id)?;

        let host_restored = previous_user_id.is_some_and(|id| *id == room.host_id);
        let user_id = UserId::generate();

        if host_restored {
            // A stale host entry can linger if the claimed identity is
            // presented from a second tab while the first is still in
            // the room; demote it so exactly one host remains.
            let current_host_id = room.host_id.clone();
            if let Some(old) = room.user_mut(&current_host_id) {
                old.is_host = false;
            }
            room.host_id = user_id.clone();
        }

        room.users.push(User {
            id: user_id.clone(),
            name: name.into(),
            icon,
            is_host: host_restored,
            card_value: None,
        });

        self.bindings.insert(
            conn,
            ConnectionBinding {
                room_id: room_id.clone(),
                user_id: user_id.clone(),
            },
        );

        if host_restored {
            tracing::info!(%room_id, %conn, "host rejoined");
        } else {
            tracing::info!(%room_id, %conn, "user rejoined as participant");
        }

        Some(RejoinOutcome {
            room: room.clone(),
            user_id,
            host_restored,
        })
    }

    /// Resolves the (room, user) a connection speaks for.
    ///
    /// This is the single authorization path every mutating operation
    /// below goes through. On failure nothing is mutated.
    ///
    /// # Errors
    /// - [`RoomError::NotBound`] — no binding for this connection
    /// - [`RoomError::RoomNotFound`] — the bound room was deleted
    /// - [`RoomError::UserNotFound`] — the bound user left the room
    pub fn resolve_context(
        &self,
        conn: ConnectionId,
    ) -> Result<(&Room, &User), RoomError> {
        let binding = self
            .bindings
            .get(&conn)
            .ok_or(RoomError::NotBound(conn))?;
        let room = self
            .rooms
            .get(&binding.room_id)
            .ok_or_else(|| RoomError::RoomNotFound(binding.room_id.clone()))?;
        let user = room
            .user(&binding.user_id)
            .ok_or_else(|| RoomError::UserNotFound(binding.user_id.clone()))?;
        Ok((room, user))
    }

    /// Like [`resolve_context`](Self::resolve_context) but returns owned
    /// ids so a mutating operation can re-borrow the room.
    fn resolve_ids(&self, conn: ConnectionId) -> Result<(RoomId, UserId), RoomError> {
        let (room, user) = self.resolve_context(conn)?;
        Ok((room.id.clone(), user.id.clone()))
    }

    /// Removes the calling user from their room and drops the binding.
    ///
    /// # Errors
    /// Same as [`resolve_context`](Self::resolve_context); nothing is
    /// mutated on failure.
    pub fn leave(&mut self, conn: ConnectionId) -> Result<LeaveOutcome, RoomError> {
        let (room_id, user_id) = self.resolve_ids(conn)?;

        self.bindings.remove(&conn);
        let room = self
            .rooms
            .get_mut(&room_id)
            .expect("room existed during resolve");
        room.users.retain(|u| u.id != user_id);
        let was_host = room.host_id == user_id;

        tracing::info!(%room_id, %conn, was_host, users = room.users.len(), "user left");

        Ok(LeaveOutcome {
            room: room.clone(),
            was_host,
        })
    }

    /// Records the calling user's estimate. `None` clears it. Any
    /// participant, host included, may vote.
    pub fn vote(
        &mut self,
        conn: ConnectionId,
        card_value: Option<f64>,
    ) -> Result<Room, RoomError> {
        let (room_id, user_id) = self.resolve_ids(conn)?;
        let room = self
            .rooms
            .get_mut(&room_id)
            .expect("room existed during resolve");
        room.user_mut(&user_id)
            .expect("user existed during resolve")
            .card_value = card_value;
        Ok(room.clone())
    }

    /// Flips the room to revealed. Idempotent: revealing an already
    /// revealed room is a no-op success.
    ///
    /// # Errors
    /// [`RoomError::Forbidden`] if the caller is not the host.
    pub fn reveal_cards(&mut self, conn: ConnectionId) -> Result<Room, RoomError> {
        let (room_id, user_id) = self.resolve_ids(conn)?;
        let room = self
            .rooms
            .get_mut(&room_id)
            .expect("room existed during resolve");

        if room.host_id != user_id {
            return Err(RoomError::Forbidden("reveal cards"));
        }

        room.revealed = true;
        Ok(room.clone())
    }

    /// Hides cards again and clears every participant's vote, the
    /// host's included.
    ///
    /// # Errors
    /// [`RoomError::Forbidden`] if the caller is not the host.
    pub fn reset_room(&mut self, conn: ConnectionId) -> Result<Room, RoomError> {
        let (room_id, user_id) = self.resolve_ids(conn)?;
        let room = self
            .rooms
            .get_mut(&room_id)
            .expect("room existed during resolve");

        if room.host_id != user_id {
            return Err(RoomError::Forbidden("reset the room"));
        }

        room.revealed = false;
        for user in &mut room.users {
            user.card_value = None;
        }
        Ok(room.clone())
    }

    /// Whether a room id is live.
    pub fn room_exists(&self, room_id: &RoomId) -> bool {
        self.rooms.contains_key(room_id)
    }

    /// Returns a room snapshot by id.
    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Deletes a room and every binding that points at it, in one step.
    ///
    /// Returns the connections that were bound to the room so the
    /// caller can notify each of them exactly once. Removing an unknown
    /// room is a no-op returning no connections.
    pub fn remove_room(&mut self, room_id: &RoomId) -> Vec<ConnectionId> {
        if self.rooms.remove(room_id).is_none() {
            return Vec::new();
        }

        let orphaned: Vec<ConnectionId> = self
            .bindings
            .iter()
            .filter(|(_, b)| &b.room_id == room_id)
            .map(|(conn, _)| *conn)
            .collect();
        self.bindings.retain(|_, b| &b.room_id != room_id);

        tracing::info!(%room_id, connections = orphaned.len(), "room removed");
        orphaned
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

// =========================================================================
// Tests
// =========================================================================
