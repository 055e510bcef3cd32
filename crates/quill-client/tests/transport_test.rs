//! WebSocket transport against a local server.

#![cfg(feature = "transport")]

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use quill_client::{TransportEvent, transport::WsConnection};
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

async fn next_event(conn: &mut WsConnection) -> TransportEvent {
    tokio::time::timeout(Duration::from_secs(5), conn.recv())
        .await
        .expect("transport event timed out")
        .expect("transport task exited")
}

#[tokio::test]
async fn echo_round_trip_then_close() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let server = tokio::spawn(async move {
        let (tcp, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(tcp).await.unwrap();
        while let Some(Ok(message)) = ws.next().await {
            if let Message::Text(text) = message {
                let reply = format!(r#"{{"type":"echo","text":{text:?}}}"#);
                ws.send(Message::Text(reply)).await.unwrap();
                ws.close(None).await.unwrap();
            }
        }
    });

    let mut conn = WsConnection::open(format!("ws://{addr}"));
    assert_eq!(next_event(&mut conn).await, TransportEvent::Opened);

    conn.send("hello".into()).unwrap();
    let TransportEvent::Text(reply) = next_event(&mut conn).await else {
        panic!("expected text reply");
    };
    assert!(reply.contains("echo"));

    assert!(matches!(next_event(&mut conn).await, TransportEvent::Closed(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn refused_connection_reports_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut conn = WsConnection::open(format!("ws://{addr}"));
    assert!(matches!(next_event(&mut conn).await, TransportEvent::Failed(_)));
}
