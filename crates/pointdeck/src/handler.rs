//! Per-connection handler: frame loop and event dispatch.
//!
//! Each accepted connection gets its own Tokio task running this
//! handler. The loop decodes one `ClientEvent` per text frame and
//! dispatches it against the shared state. Failed operations answer the
//! sender with an `error` event and never broadcast; a malformed frame
//! is answered the same way and skipped.
//!
//! A socket closing (cleanly or not) is treated exactly like an
//! explicit `leave_room`: the departure path runs once, and running it
//! again is a no-op because the binding is already gone.

use std::sync::Arc;

use pointdeck_protocol::{ClientEvent, Codec, ConnectionId, Room, RoomId, ServerEvent, UserId};
use pointdeck_room::{RejoinOutcome, RoomError, is_unanimous};
use pointdeck_transport::{OutboundSink, WsConnection};

use crate::PointdeckError;
use crate::server::{Inner, ServerState};

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    mut conn: WsConnection,
    state: Arc<ServerState>,
) -> Result<(), PointdeckError> {
    let conn_id = conn.id();
    let sink = conn.outbound();
    tracing::debug!(%conn_id, "handling new connection");

    let result = connection_loop(&mut conn, &state, &sink).await;

    // Runs on every exit path, clean close and error alike.
    handle_departure(&state, conn_id).await;

    result
}

/// Receives and dispatches frames until the peer goes away.
async fn connection_loop(
    conn: &mut WsConnection,
    state: &Arc<ServerState>,
    sink: &OutboundSink,
) -> Result<(), PointdeckError> {
    let conn_id = conn.id();

    loop {
        let frame = match conn.recv().await {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                tracing::debug!(%conn_id, "connection closed");
                return Ok(());
            }
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "recv error");
                return Ok(());
            }
        };

        let event: ClientEvent = match state.codec.decode(&frame) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!(%conn_id, error = %e, "malformed frame");
                unicast(state, sink, &ServerEvent::Error {
                    message: format!("invalid event: {e}"),
                })?;
                continue;
            }
        };

        dispatch(state, conn_id, sink, event).await?;
    }
}

/// Routes one decoded event to its operation.
async fn dispatch(
    state: &Arc<ServerState>,
    conn_id: ConnectionId,
    sink: &OutboundSink,
    event: ClientEvent,
) -> Result<(), PointdeckError> {
    match event {
        ClientEvent::CreateRoom { name, icon } => {
            let room = {
                let mut inner = state.inner.lock().await;
                let room = inner.store.create_room(conn_id, name, icon);
                inner.groups.join(room.id.clone(), sink.clone());
                room
            };
            unicast(state, sink, &ServerEvent::CreateRoom { room })?;
        }

        ClientEvent::JoinRoom {
            room_id,
            name,
            icon,
            saved_user_id,
        } => {
            handle_join(state, conn_id, sink, room_id, name, icon, saved_user_id).await?;
        }

        ClientEvent::CheckRoom { room_id } => {
            let exists = state.inner.lock().await.store.room_exists(&room_id);
            let reply = if exists {
                ServerEvent::RoomFound { room_id }
            } else {
                ServerEvent::RoomNotFound { room_id }
            };
            unicast(state, sink, &reply)?;
        }

        ClientEvent::Vote { card_value } => {
            let mut inner = state.inner.lock().await;
            match inner.store.vote(conn_id, card_value) {
                Ok(room) => broadcast_room_update(state, &inner, &room)?,
                Err(e) => report(state, sink, &e)?,
            }
        }

        ClientEvent::RevealCards => {
            let mut inner = state.inner.lock().await;
            match inner.store.reveal_cards(conn_id) {
                Ok(room) => {
                    broadcast_room_update(state, &inner, &room)?;
                    if is_unanimous(&room) {
                        let frame = state.codec.encode(&ServerEvent::UnanimousVote)?;
                        inner.groups.broadcast(&room.id, &frame);
                    }
                }
                Err(e) => report(state, sink, &e)?,
            }
        }

        ClientEvent::ResetRoom => {
            let mut inner = state.inner.lock().await;
            match inner.store.reset_room(conn_id) {
                Ok(room) => broadcast_room_update(state, &inner, &room)?,
                Err(e) => report(state, sink, &e)?,
            }
        }

        ClientEvent::LeaveRoom => {
            // Same path as a socket close; the connection stays open so
            // the client can check or join another room afterwards.
            handle_departure(state, conn_id).await;
        }
    }

    Ok(())
}

/// The join path. Every join is potentially a rejoin: a client that
/// presents the saved id of the room's current host reclaims host
/// status and cancels any pending disband.
async fn handle_join(
    state: &Arc<ServerState>,
    conn_id: ConnectionId,
    sink: &OutboundSink,
    room_id: RoomId,
    name: String,
    icon: Option<String>,
    saved_user_id: Option<UserId>,
) -> Result<(), PointdeckError> {
    let mut inner = state.inner.lock().await;

    let joined = match saved_user_id {
        Some(prev) => inner
            .store
            .rejoin_room(conn_id, &room_id, name, icon, Some(&prev)),
        None => match inner.store.join_room(conn_id, &room_id, name, icon) {
            Ok((room, user_id)) => Some(RejoinOutcome {
                room,
                user_id,
                host_restored: false,
            }),
            // join_room only fails on an unknown room.
            Err(_) => None,
        },
    };

    let Some(outcome) = joined else {
        drop(inner);
        return unicast(state, sink, &ServerEvent::RoomNotFound { room_id });
    };

    if outcome.host_restored && inner.scheduler.disarm(&room_id) {
        tracing::info!(%room_id, %conn_id, "host returned, disband cancelled");
    }

    inner.groups.join(room_id.clone(), sink.clone());

    // The joiner gets join_room (with the id to persist) before the
    // room_update every member receives.
    unicast(state, sink, &ServerEvent::JoinRoom {
        room: outcome.room.clone(),
        user_id: outcome.user_id,
    })?;
    broadcast_room_update(state, &inner, &outcome.room)?;

    Ok(())
}

/// Removes the connection's user from their room, tells the remaining
/// members, and arms the disband timer when the host departed.
///
/// No-op for connections that aren't in a room. Never fails the caller:
/// departure runs on close paths where there is nobody left to tell.
async fn handle_departure(state: &Arc<ServerState>, conn_id: ConnectionId) {
    let mut inner = state.inner.lock().await;

    let outcome = match inner.store.leave(conn_id) {
        Ok(outcome) => outcome,
        Err(RoomError::NotBound(_)) => return,
        Err(e) => {
            tracing::warn!(%conn_id, error = %e, "departure cleanup failed");
            return;
        }
    };

    inner.groups.leave(&outcome.room.id, conn_id);
    if let Err(e) = broadcast_room_update(state, &inner, &outcome.room) {
        tracing::error!(%conn_id, error = %e, "failed to broadcast departure");
    }

    if outcome.was_host {
        inner.scheduler.arm(outcome.room.id.clone());
    }
}

/// Encodes a `room_update` once and delivers it to the room's group.
fn broadcast_room_update(
    state: &ServerState,
    inner: &Inner,
    room: &Room,
) -> Result<(), PointdeckError> {
    let frame = state.codec.encode(&ServerEvent::RoomUpdate { room: room.clone() })?;
    inner.groups.broadcast(&room.id, &frame);
    Ok(())
}

/// Sends one event to one connection.
fn unicast(
    state: &ServerState,
    sink: &OutboundSink,
    event: &ServerEvent,
) -> Result<(), PointdeckError> {
    let frame = state.codec.encode(event)?;
    sink.send_text(frame)?;
    Ok(())
}

/// Reports a failed operation to its sender only.
fn report(
    state: &ServerState,
    sink: &OutboundSink,
    error: &RoomError,
) -> Result<(), PointdeckError> {
    unicast(state, sink, &ServerEvent::Error {
        message: error.to_string(),
    })
}
