//! Wire protocol and shared state types for Pointdeck.
//!
//! This crate defines the "language" that clients and the server speak:
//!
//! - **Identifiers** ([`RoomId`], [`UserId`], [`ConnectionId`]) — opaque
//!   ids for rooms, participants, and live connections.
//! - **State types** ([`Room`], [`User`]) — the planning-room snapshot
//!   that travels inside events.
//! - **Events** ([`ClientEvent`], [`ServerEvent`]) — every inbound and
//!   outbound message, one tagged variant per event name.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how events are
//!   converted to/from WebSocket text frames.
//! - **Errors** ([`ProtocolError`]) — what can go wrong at the boundary.
//!
//! The protocol layer knows nothing about connections, timers, or the
//! room store — it only describes shapes on the wire.

mod codec;
mod error;
mod events;
mod ids;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use events::{ClientEvent, ServerEvent};
pub use ids::{ConnectionId, RoomId, UserId};
pub use types::{Room, User};
