//! # Pointdeck
//!
//! Real-time planning poker over WebSockets.
//!
//! A host creates a room, teammates join by id, everyone votes in
//! secret, the host reveals, and the table resets for the next story.
//! If the host drops, the room survives a grace period so they can
//! reclaim it with the user id their client saved.
//!
//! This crate is the gateway: it owns the accept loop, the
//! per-connection handlers, the broadcast groups, and the disband
//! reaper. The session rules live in `pointdeck-room`, the timers in
//! `pointdeck-disband`, the wire format in `pointdeck-protocol`.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use pointdeck::PointdeckServer;
//!
//! # async fn run() -> Result<(), pointdeck::PointdeckError> {
//! let server = PointdeckServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod groups;
mod handler;
mod server;

pub use error::PointdeckError;
pub use server::{PointdeckServer, PointdeckServerBuilder};

// The types a server embedder or test client needs, re-exported so the
// binary and integration tests don't name every sub-crate.
pub use pointdeck_disband::DisbandConfig;
pub use pointdeck_protocol::{ClientEvent, Room, RoomId, ServerEvent, User, UserId};
