//! Grace-period disband scheduler for Pointdeck.
//!
//! When a host leaves their room, the room is not torn down immediately:
//! the host gets a grace window to reconnect (page reload, flaky WiFi).
//! This crate owns only the timers — it never touches room state.
//!
//! # Contract with the gateway
//!
//! The scheduler lives behind the same mutex as the room store. The
//! gateway arms a timer when a host departs and disarms it when the
//! host reclaims the room. When a timer fires, a [`DisbandExpiry`] is
//! delivered on the expiry channel; the reaper task must then take the
//! shared lock and call [`DisbandScheduler::confirm`] — only a `true`
//! return means the disband is still wanted.
//!
//! Every armed timer carries a generation number, and an expiry only
//! confirms against the generation that produced it. That closes both
//! races around the grace deadline: a rejoin that disarms after the
//! timer fired leaves a stale expiry in the channel, and if the host
//! then leaves again, the new timer's generation differs — so the
//! stale expiry can never cut the fresh grace window short.
//!
//! ```ignore
//! loop {
//!     let Some(expiry) = expired_rx.recv().await else { break };
//!     let mut inner = state.lock().await;
//!     if inner.scheduler.confirm(&expiry) {
//!         let orphaned = inner.store.remove_room(&expiry.room_id);
//!         // notify orphaned connections...
//!     }
//! }
//! ```

use std::collections::HashMap;
use std::time::Duration;

use pointdeck_protocol::RoomId;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Configuration for the disband scheduler.
#[derive(Debug, Clone)]
pub struct DisbandConfig {
    /// How long a room survives after its host leaves.
    pub grace: Duration,
}

impl Default for DisbandConfig {
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(30),
        }
    }
}

/// A fired grace timer, delivered on the expiry channel.
///
/// `generation` identifies the exact timer that fired; [`confirm`]
/// rejects an expiry whose generation no longer matches the armed one.
///
/// [`confirm`]: DisbandScheduler::confirm
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisbandExpiry {
    pub room_id: RoomId,
    pub generation: u64,
}

/// One armed grace timer.
struct Armed {
    generation: u64,
    handle: JoinHandle<()>,
}

/// Tracks pending disband timers, one per room at most.
///
/// Each armed timer is a spawned task that sleeps for the grace period
/// and then sends its `(room, generation)` pair on the expiry channel.
/// Disarming aborts the task; aborting an already-finished task is
/// harmless.
pub struct DisbandScheduler {
    config: DisbandConfig,
    pending: HashMap<RoomId, Armed>,
    next_generation: u64,
    expired_tx: mpsc::UnboundedSender<DisbandExpiry>,
}

impl DisbandScheduler {
    /// Creates a scheduler and the channel its expirations arrive on.
    pub fn new(config: DisbandConfig) -> (Self, mpsc::UnboundedReceiver<DisbandExpiry>) {
        let (expired_tx, expired_rx) = mpsc::unbounded_channel();
        (
            Self {
                config,
                pending: HashMap::new(),
                next_generation: 0,
                expired_tx,
            },
            expired_rx,
        )
    }

    /// Starts the grace timer for a room.
    ///
    /// Idempotent: if a timer is already running for this room the call
    /// is a no-op and the original deadline stands. A fresh arm after a
    /// disarm gets a new generation, so expirations from earlier timers
    /// for the same room can never confirm against it.
    pub fn arm(&mut self, room_id: RoomId) {
        if self.pending.contains_key(&room_id) {
            debug!(%room_id, "disband already armed");
            return;
        }

        self.next_generation += 1;
        let generation = self.next_generation;

        let grace = self.config.grace;
        let tx = self.expired_tx.clone();
        let expiry = DisbandExpiry {
            room_id: room_id.clone(),
            generation,
        };
        let handle = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            // The receiver only drops at shutdown; a failed send means
            // nobody is left to disband anything.
            let _ = tx.send(expiry);
        });

        info!(%room_id, generation, grace_secs = grace.as_secs(), "disband armed");
        self.pending.insert(room_id, Armed { generation, handle });
    }

    /// Cancels the grace timer for a room, whatever its generation.
    ///
    /// This is the rejoin path: the host is back, so any pending timer
    /// for the room is void. Returns `true` if a timer was armed;
    /// disarming a room with no timer is a safe no-op returning `false`.
    pub fn disarm(&mut self, room_id: &RoomId) -> bool {
        match self.pending.remove(room_id) {
            Some(armed) => {
                armed.handle.abort();
                info!(%room_id, generation = armed.generation, "disband disarmed");
                true
            }
            None => false,
        }
    }

    /// Confirms a fired timer, consuming its armed entry.
    ///
    /// Returns `true` only when the expiry's generation matches the
    /// currently armed timer for its room — the reaper must delete the
    /// room exactly then. A stale expiry (its timer was disarmed, or
    /// the room has since been re-armed with a newer generation) leaves
    /// the current timer untouched and returns `false`.
    pub fn confirm(&mut self, expiry: &DisbandExpiry) -> bool {
        match self.pending.get(&expiry.room_id) {
            Some(armed) if armed.generation == expiry.generation => {
                self.pending.remove(&expiry.room_id);
                true
            }
            Some(armed) => {
                debug!(
                    room_id = %expiry.room_id,
                    stale = expiry.generation,
                    armed = armed.generation,
                    "stale expiry ignored, newer timer armed"
                );
                false
            }
            None => false,
        }
    }

    /// Whether a disband timer is armed for this room.
    pub fn is_armed(&self, room_id: &RoomId) -> bool {
        self.pending.contains_key(room_id)
    }

    /// Number of rooms with a pending disband.
    pub fn armed_count(&self) -> usize {
        self.pending.len()
    }
}

// =========================================================================
// Tests
// =========================================================================
