//! Integration tests for the WebSocket transport: a real listener, a
//! real tokio-tungstenite client, and frames over an actual socket.

use futures_util::{SinkExt, StreamExt};
use pointdeck_transport::{WsConnection, WsListener};
use tokio_tungstenite::tungstenite::Message;

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Binds a listener on a random port and pairs one server connection
/// with one client stream.
async fn pair() -> (WsConnection, ClientWs) {
    let mut listener = WsListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr").to_string();

    let accept = tokio::spawn(async move { listener.accept().await.expect("accept") });
    let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}"))
        .await
        .expect("client connect");
    let server = accept.await.expect("accept task");

    (server, client)
}

#[tokio::test]
async fn test_text_frames_flow_both_ways() {
    let (mut server, mut client) = pair().await;

    client
        .send(Message::Text("from client".into()))
        .await
        .expect("client send");
    let received = server.recv().await.expect("recv").expect("open");
    assert_eq!(received, "from client");

    server.outbound().send_text("from server").expect("queue");
    let msg = client.next().await.expect("frame").expect("recv");
    assert_eq!(msg, Message::Text("from server".into()));
}

#[tokio::test]
async fn test_connection_ids_are_unique() {
    let (a, _client_a) = pair().await;
    let (b, _client_b) = pair().await;

    assert_ne!(a.id(), b.id());
    assert_eq!(a.outbound().connection_id(), a.id());
}

#[tokio::test]
async fn test_recv_returns_none_when_client_closes() {
    let (mut server, mut client) = pair().await;

    client.close(None).await.expect("client close");

    let received = server.recv().await.expect("recv");
    assert!(received.is_none());
}

#[tokio::test]
async fn test_recv_skips_non_text_frames() {
    let (mut server, mut client) = pair().await;

    client
        .send(Message::Binary(b"blob".to_vec().into()))
        .await
        .expect("send binary");
    client
        .send(Message::Text("after the blob".into()))
        .await
        .expect("send text");

    // The binary frame is silently skipped.
    let received = server.recv().await.expect("recv").expect("open");
    assert_eq!(received, "after the blob");
}

#[tokio::test]
async fn test_close_reaches_the_client() {
    let (server, mut client) = pair().await;

    server.outbound().close().expect("queue close");

    // The client observes either an explicit close frame or the end of
    // the stream, depending on shutdown timing.
    match client.next().await {
        Some(Ok(Message::Close(_))) | None => {}
        Some(Err(_)) => {}
        other => panic!("expected close, got {other:?}"),
    }
}

#[tokio::test]
async fn test_cloned_sinks_feed_the_same_connection() {
    let (server, mut client) = pair().await;

    let sink_a = server.outbound();
    let sink_b = sink_a.clone();
    sink_a.send_text("one").expect("queue");
    sink_b.send_text("two").expect("queue");

    let first = client.next().await.expect("frame").expect("recv");
    let second = client.next().await.expect("frame").expect("recv");
    assert_eq!(first, Message::Text("one".into()));
    assert_eq!(second, Message::Text("two".into()));
}
