//! Connection groups: which sockets receive a room's broadcasts.
//!
//! A group is the set of outbound sinks for every connection currently
//! in a room. Broadcasting encodes the frame once (the caller's job)
//! and hands the same string to each sink. Group membership mirrors the
//! store's bindings and is mutated under the same lock, so a broadcast
//! observed by one member is observed by all of them.

use std::collections::HashMap;

use pointdeck_protocol::{ConnectionId, RoomId};
use pointdeck_transport::OutboundSink;

/// Room-id-keyed registry of broadcast groups.
#[derive(Default)]
pub(crate) struct ConnectionGroups {
    groups: HashMap<RoomId, HashMap<ConnectionId, OutboundSink>>,
}

impl ConnectionGroups {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Adds a connection's sink to a room's group. Re-joining replaces
    /// the previous sink for that connection.
    pub(crate) fn join(&mut self, room_id: RoomId, sink: OutboundSink) {
        self.groups
            .entry(room_id)
            .or_default()
            .insert(sink.connection_id(), sink);
    }

    /// Removes a connection from a room's group. Unknown room or member
    /// is a no-op. Empty groups are dropped.
    pub(crate) fn leave(&mut self, room_id: &RoomId, conn: ConnectionId) {
        if let Some(members) = self.groups.get_mut(room_id) {
            members.remove(&conn);
            if members.is_empty() {
                self.groups.remove(room_id);
            }
        }
    }

    /// Sends an already-encoded frame to every member of a room's group.
    ///
    /// A sink whose pump has exited is skipped; its connection handler
    /// will clean the membership up on its own exit path.
    pub(crate) fn broadcast(&self, room_id: &RoomId, frame: &str) -> usize {
        let Some(members) = self.groups.get(room_id) else {
            return 0;
        };

        let mut delivered = 0;
        for (conn, sink) in members {
            match sink.send_text(frame) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::debug!(%room_id, %conn, error = %e, "broadcast skipped dead sink");
                }
            }
        }
        delivered
    }

    /// Removes a whole group, returning its sinks so the caller can
    /// deliver one final frame to each former member.
    pub(crate) fn remove_group(&mut self, room_id: &RoomId) -> Vec<OutboundSink> {
        self.groups
            .remove(room_id)
            .map(|members| members.into_values().collect())
            .unwrap_or_default()
    }

    /// Number of connections in a room's group.
    #[cfg(test)]
    pub(crate) fn member_count(&self, room_id: &RoomId) -> usize {
        self.groups.get(room_id).map_or(0, HashMap::len)
    }
}
