//! The room session state machine for Pointdeck.
//!
//! This crate owns every rule of a planning session:
//!
//! 1. **Room store** — the in-memory table of live rooms ([`RoomStore`])
//! 2. **Identity map** — which (room, user) each connection speaks for
//! 3. **Session rules** — create/join/rejoin/vote/reveal/reset/leave,
//!    host-authority checks, and unanimity detection
//!
//! # How it fits in the stack
//!
//! ```text
//! Gateway (above)  ← maps wire events to operations, fans out replies
//!     ↕
//! Room layer (this crate)  ← all mutable session state and its rules
//!     ↕
//! Protocol layer (below)  ← provides RoomId, UserId, Room, User types
//! ```
//!
//! The store has no interior locking and no timers; the gateway owns it
//! behind a single mutex and drives the disband scheduler around it.

mod error;
mod rules;
mod store;

pub use error::RoomError;
pub use rules::is_unanimous;
pub use store::{ConnectionBinding, LeaveOutcome, RejoinOutcome, RoomStore};
