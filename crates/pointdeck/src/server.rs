//! `PointdeckServer` builder and server loop.
//!
//! This is the entry point for running a Pointdeck server. It ties
//! together all the layers: transport → protocol → room → disband.

use std::sync::Arc;

use pointdeck_disband::{DisbandConfig, DisbandExpiry, DisbandScheduler};
use pointdeck_protocol::{Codec, JsonCodec, ServerEvent};
use pointdeck_room::RoomStore;
use pointdeck_transport::WsListener;
use tokio::sync::{Mutex, mpsc};

use crate::PointdeckError;
use crate::groups::ConnectionGroups;
use crate::handler::handle_connection;

/// Everything that mutates together: room state, pending disband
/// timers, and broadcast group membership.
///
/// One mutex over all three is what makes every operation atomic from
/// the outside — a broadcast always reflects a fully applied mutation,
/// and the rejoin-vs-expiry race is decided by lock order alone.
pub(crate) struct Inner {
    pub(crate) store: RoomStore,
    pub(crate) scheduler: DisbandScheduler,
    pub(crate) groups: ConnectionGroups,
}

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) inner: Mutex<Inner>,
    pub(crate) codec: JsonCodec,
}

/// Builder for configuring and starting a Pointdeck server.
///
/// # Example
///
/// ```rust,ignore
/// let server = PointdeckServer::builder()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct PointdeckServerBuilder {
    bind_addr: String,
    disband: DisbandConfig,
}

impl PointdeckServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            disband: DisbandConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the disband grace-period configuration.
    pub fn disband_config(mut self, config: DisbandConfig) -> Self {
        self.disband = config;
        self
    }

    /// Binds the listener and assembles the server.
    pub async fn build(self) -> Result<PointdeckServer, PointdeckError> {
        let listener = WsListener::bind(&self.bind_addr).await?;
        let (scheduler, expired_rx) = DisbandScheduler::new(self.disband);

        let state = Arc::new(ServerState {
            inner: Mutex::new(Inner {
                store: RoomStore::new(),
                scheduler,
                groups: ConnectionGroups::new(),
            }),
            codec: JsonCodec,
        });

        Ok(PointdeckServer {
            listener,
            state,
            expired_rx,
        })
    }
}

impl Default for PointdeckServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Pointdeck server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct PointdeckServer {
    listener: WsListener,
    state: Arc<ServerState>,
    expired_rx: mpsc::UnboundedReceiver<DisbandExpiry>,
}

impl PointdeckServer {
    /// Creates a new builder.
    pub fn builder() -> PointdeckServerBuilder {
        PointdeckServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the server: the disband reaper plus the accept loop.
    ///
    /// Accepts incoming connections and spawns a handler task for each.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), PointdeckError> {
        tracing::info!("pointdeck server running");

        tokio::spawn(run_reaper(Arc::clone(&self.state), self.expired_rx));

        loop {
            match self.listener.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}

/// Drains disband expirations and tears down rooms whose host never
/// came back.
///
/// The generation-checked `confirm` under the state lock is what
/// decides the rejoin-vs-expiry race: an expiry whose timer was
/// disarmed by a host rejoin — even if the room was re-armed since —
/// is stale and skipped.
async fn run_reaper(
    state: Arc<ServerState>,
    mut expired_rx: mpsc::UnboundedReceiver<DisbandExpiry>,
) {
    while let Some(expiry) = expired_rx.recv().await {
        let room_id = expiry.room_id.clone();
        let sinks = {
            let mut inner = state.inner.lock().await;
            if !inner.scheduler.confirm(&expiry) {
                tracing::debug!(%room_id, "expiry raced a host rejoin, skipped");
                continue;
            }
            inner.store.remove_room(&room_id);
            inner.groups.remove_group(&room_id)
        };

        let frame = match state.codec.encode(&ServerEvent::DisbandRoom) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::error!(%room_id, error = %e, "failed to encode disband event");
                continue;
            }
        };
        for sink in &sinks {
            // A dead sink just means that client is already gone.
            let _ = sink.send_text(&frame);
        }

        tracing::info!(%room_id, notified = sinks.len(), "room disbanded, grace period expired");
    }
}
