//! Inbound and outbound protocol events.
//!
//! Every event is one tagged variant: the `"event"` field on the wire
//! carries the snake_case event name, payload fields are camelCase.
//! A create_room request looks like:
//!
//! ```json
//! { "event": "create_room", "name": "Sam", "icon": "rocket" }
//! ```
//!
//! Validation happens here, at the boundary: a frame that doesn't
//! deserialize into one of these variants never reaches the room store.

use serde::{Deserialize, Serialize};

use crate::{Room, RoomId, UserId};

/// Events a client sends to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ClientEvent {
    /// Open a new room; the sender becomes its host.
    CreateRoom {
        name: String,
        #[serde(default)]
        icon: Option<String>,
    },

    /// Join an existing room by id.
    ///
    /// `saved_user_id` is the id the client kept from a previous visit.
    /// If it matches the room's current host id, the sender is restored
    /// as host and any pending disband is cancelled.
    JoinRoom {
        room_id: RoomId,
        name: String,
        #[serde(default)]
        icon: Option<String>,
        #[serde(default)]
        saved_user_id: Option<UserId>,
    },

    /// Ask whether a room id is live (stale link / typo check).
    CheckRoom { room_id: RoomId },

    /// Record the sender's estimate. `None` clears it.
    Vote { card_value: Option<f64> },

    /// Flip the room to revealed. Host only.
    RevealCards,

    /// Hide cards and clear every vote. Host only.
    ResetRoom,

    /// Leave the current room explicitly.
    LeaveRoom,
}

/// Events the server sends to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    /// Unicast reply to `create_room`.
    CreateRoom { room: Room },

    /// Unicast reply to a successful `join_room`; `user_id` is the
    /// identity the client should persist for reconnection.
    JoinRoom { room: Room, user_id: UserId },

    /// Broadcast whenever a room's state changes.
    RoomUpdate { room: Room },

    /// Unicast reply to `check_room` for a live room.
    RoomFound { room_id: RoomId },

    /// Unicast reply to `check_room` / `join_room` for an unknown room.
    RoomNotFound { room_id: RoomId },

    /// Broadcast after a reveal where every vote is set and equal.
    UnanimousVote,

    /// Broadcast to a room's connections when the grace period expires
    /// without the host returning. Sent exactly once per room.
    DisbandRoom,

    /// Unicast report of a failed operation. Other participants see
    /// nothing for a failed request.
    Error { message: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::User;

    // The web client depends on these exact JSON shapes; the tests pin
    // the tag names and payload field casing.

    #[test]
    fn test_client_event_create_room_json_shape() {
        let json = r#"{ "event": "create_room", "name": "Sam", "icon": "cat" }"#;
        let ev: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            ev,
            ClientEvent::CreateRoom {
                name: "Sam".into(),
                icon: Some("cat".into()),
            }
        );
    }

    #[test]
    fn test_client_event_create_room_icon_optional() {
        let json = r#"{ "event": "create_room", "name": "Sam" }"#;
        let ev: ClientEvent = serde_json::from_str(json).unwrap();
        assert!(matches!(ev, ClientEvent::CreateRoom { icon: None, .. }));
    }

    #[test]
    fn test_client_event_join_room_camel_case_fields() {
        let json = r#"{
            "event": "join_room",
            "roomId": "abc123",
            "name": "Priya",
            "savedUserId": "deadbeef"
        }"#;
        let ev: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            ev,
            ClientEvent::JoinRoom {
                room_id: RoomId("abc123".into()),
                name: "Priya".into(),
                icon: None,
                saved_user_id: Some(UserId("deadbeef".into())),
            }
        );
    }

    #[test]
    fn test_client_event_vote_null_clears() {
        let json = r#"{ "event": "vote", "cardValue": null }"#;
        let ev: ClientEvent = serde_json::from_str(json).unwrap();
        assert_eq!(ev, ClientEvent::Vote { card_value: None });
    }

    #[test]
    fn test_client_event_payloadless_events() {
        for (json, expected) in [
            (r#"{ "event": "reveal_cards" }"#, ClientEvent::RevealCards),
            (r#"{ "event": "reset_room" }"#, ClientEvent::ResetRoom),
            (r#"{ "event": "leave_room" }"#, ClientEvent::LeaveRoom),
        ] {
            let ev: ClientEvent = serde_json::from_str(json).unwrap();
            assert_eq!(ev, expected);
        }
    }

    #[test]
    fn test_client_event_unknown_event_rejected() {
        let json = r#"{ "event": "fly_to_moon", "speed": 9000 }"#;
        let result: Result<ClientEvent, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_server_event_room_update_json_shape() {
        let room = Room {
            id: RoomId("r1".into()),
            host_id: UserId("u1".into()),
            users: vec![User {
                id: UserId("u1".into()),
                name: "Sam".into(),
                icon: None,
                is_host: true,
                card_value: None,
            }],
            revealed: false,
        };
        let json: serde_json::Value =
            serde_json::to_value(ServerEvent::RoomUpdate { room }).unwrap();

        assert_eq!(json["event"], "room_update");
        assert_eq!(json["room"]["hostId"], "u1");
        assert_eq!(json["room"]["users"][0]["isHost"], true);
    }

    #[test]
    fn test_server_event_join_room_carries_user_id() {
        let room = Room {
            id: RoomId("r1".into()),
            host_id: UserId("u1".into()),
            users: vec![],
            revealed: false,
        };
        let json: serde_json::Value = serde_json::to_value(ServerEvent::JoinRoom {
            room,
            user_id: UserId("u2".into()),
        })
        .unwrap();

        assert_eq!(json["event"], "join_room");
        assert_eq!(json["userId"], "u2");
    }

    #[test]
    fn test_server_event_room_not_found_json_shape() {
        let json: serde_json::Value =
            serde_json::to_value(ServerEvent::RoomNotFound {
                room_id: RoomId("gone".into()),
            })
            .unwrap();
        assert_eq!(json["event"], "room_not_found");
        assert_eq!(json["roomId"], "gone");
    }

    #[test]
    fn test_server_event_payloadless_tags() {
        let json: serde_json::Value =
            serde_json::to_value(ServerEvent::DisbandRoom).unwrap();
        assert_eq!(json["event"], "disband_room");

        let json: serde_json::Value =
            serde_json::to_value(ServerEvent::UnanimousVote).unwrap();
        assert_eq!(json["event"], "unanimous_vote");
    }

    #[test]
    fn test_server_event_error_json_shape() {
        let json: serde_json::Value = serde_json::to_value(ServerEvent::Error {
            message: "only the host can reveal cards".into(),
        })
        .unwrap();
        assert_eq!(json["event"], "error");
        assert_eq!(json["message"], "only the host can reveal cards");
    }
}
