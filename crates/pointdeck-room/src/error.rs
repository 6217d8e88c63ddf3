//! Error types for the room layer.
//!
//! All of these are recoverable and local to one request: the gateway
//! reports them to the originating connection only and the process
//! stays serviceable.

use pointdeck_protocol::{ConnectionId, RoomId, UserId};

/// Errors that can occur during room operations.
#[derive(Debug, thiserror::Error)]
pub enum RoomError {
    /// The room does not exist (or no longer exists).
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// The connection has no room/user association.
    #[error("connection {0} is not associated with a room")]
    NotBound(ConnectionId),

    /// The binding points at a user that is no longer in the room.
    #[error("user {0} not found in room")]
    UserNotFound(UserId),

    /// A non-host attempted a host-only action.
    #[error("only the host can {0}")]
    Forbidden(&'static str),
}
