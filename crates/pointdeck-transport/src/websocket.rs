//! WebSocket listener and connection using `tokio-tungstenite`.

use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitStream, StreamExt};
use pointdeck_protocol::ConnectionId;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::TransportError;

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// Accepts incoming WebSocket connections.
pub struct WsListener {
    listener: TcpListener,
}

impl WsListener {
    /// Binds the listener to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket transport listening");
        Ok(Self { listener })
    }

    /// Returns the local address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Waits for the next connection and completes the WebSocket
    /// handshake. The returned connection already has its outbound pump
    /// running.
    pub async fn accept(&mut self) -> Result<WsConnection, TransportError> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let ws = tokio_tungstenite::accept_async(stream).await.map_err(|e| {
            TransportError::AcceptFailed(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                e,
            ))
        })?;

        let id = ConnectionId::new(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %addr, "accepted WebSocket connection");

        Ok(WsConnection::spawn_pump(id, ws))
    }
}

/// A handle that queues outbound text frames for one connection.
///
/// Clones share the same underlying channel. Sending never blocks; if
/// the pump task has exited (peer gone) the frame is dropped and
/// [`TransportError::ConnectionClosed`] is returned.
#[derive(Clone)]
pub struct OutboundSink {
    id: ConnectionId,
    tx: mpsc::UnboundedSender<Message>,
}

impl OutboundSink {
    /// Creates a sink backed by a bare channel, with no pump task.
    ///
    /// The caller receives the frames directly. Used in tests that need
    /// to observe what a sink was handed without a real socket.
    pub fn detached(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { id, tx }, rx)
    }

    /// Queues a text frame for delivery.
    pub fn send_text(&self, frame: impl Into<String>) -> Result<(), TransportError> {
        self.tx
            .send(Message::Text(frame.into().into()))
            .map_err(|_| TransportError::ConnectionClosed)
    }

    /// Queues a close frame. The pump exits after flushing it.
    pub fn close(&self) -> Result<(), TransportError> {
        self.tx
            .send(Message::Close(None))
            .map_err(|_| TransportError::ConnectionClosed)
    }

    /// The id of the connection this sink feeds.
    pub fn connection_id(&self) -> ConnectionId {
        self.id
    }
}

/// A single accepted connection: the read half plus the outbound sink.
pub struct WsConnection {
    id: ConnectionId,
    incoming: SplitStream<WsStream>,
    outbound: OutboundSink,
}

impl WsConnection {
    /// Splits the stream and spawns the write pump.
    fn spawn_pump(id: ConnectionId, ws: WsStream) -> Self {
        let (mut sink, incoming) = ws.split();
        let (tx, mut rx) = mpsc::unbounded_channel::<Message>();

        tokio::spawn(async move {
            use futures_util::SinkExt;
            while let Some(msg) = rx.recv().await {
                let closing = matches!(msg, Message::Close(_));
                if sink.send(msg).await.is_err() {
                    tracing::debug!(%id, "outbound pump: peer gone");
                    break;
                }
                if closing {
                    break;
                }
            }
        });

        Self {
            id,
            incoming,
            outbound: OutboundSink { id, tx },
        }
    }

    /// Returns the unique identifier for this connection.
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns a clone of the outbound sink for this connection.
    pub fn outbound(&self) -> OutboundSink {
        self.outbound.clone()
    }

    /// Receives the next text frame.
    ///
    /// Returns `Ok(None)` when the peer closed the connection. Binary,
    /// ping, and pong frames are skipped.
    pub async fn recv(&mut self) -> Result<Option<String>, TransportError> {
        loop {
            match self.incoming.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(text.to_string())),
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue,
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        e,
                    )));
                }
            }
        }
    }
}
