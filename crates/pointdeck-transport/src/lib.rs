//! WebSocket transport for Pointdeck.
//!
//! Each accepted connection is split in two:
//!
//! - a **read half**, owned by the connection's handler task, which
//!   yields inbound text frames one at a time;
//! - an **outbound handle** ([`OutboundSink`]), a cheap-to-clone sender
//!   backed by an mpsc channel and a pump task. The gateway registers a
//!   clone of it in the room's connection group, so broadcasts can be
//!   pushed to a socket at any moment without contending with the read
//!   loop.
//!
//! The transport carries text frames only; what's inside them is the
//! protocol crate's business.

mod error;
mod websocket;

pub use error::TransportError;
pub use websocket::{OutboundSink, WsConnection, WsListener};

// Re-exported so sink consumers can match on frames without naming
// tungstenite themselves.
pub use tokio_tungstenite::tungstenite::Message;
