//! Unified error type for the Pointdeck server.

use pointdeck_protocol::ProtocolError;
use pointdeck_room::RoomError;
use pointdeck_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant auto-generates `From` impls,
/// so `?` converts sub-crate errors automatically inside the gateway.
#[derive(Debug, thiserror::Error)]
pub enum PointdeckError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode, invalid event).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A room-level error (not found, not bound, forbidden).
    #[error(transparent)]
    Room(#[from] RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pointdeck_protocol::RoomId;

    #[test]
    fn test_from_transport_error() {
        let err = TransportError::ConnectionClosed;
        let top: PointdeckError = err.into();
        assert!(matches!(top, PointdeckError::Transport(_)));
        assert!(top.to_string().contains("connection closed"));
    }

    #[test]
    fn test_from_protocol_error() {
        let err = ProtocolError::InvalidEvent("bad".into());
        let top: PointdeckError = err.into();
        assert!(matches!(top, PointdeckError::Protocol(_)));
    }

    #[test]
    fn test_from_room_error() {
        let err = RoomError::RoomNotFound(RoomId("r1".into()));
        let top: PointdeckError = err.into();
        assert!(matches!(top, PointdeckError::Room(_)));
        assert!(top.to_string().contains("not found"));
    }
}
