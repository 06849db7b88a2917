//! Integration tests for WebSocket connection and messaging.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use http::StatusCode;
use serde_json::{Value, json};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

use docrelay_core::types::UserId;
use docrelay_database::Stores;
use docrelay_realtime::RealtimeEngine;

use crate::helpers::{self, PUSH_TIMEOUT, TestApp};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// A server on an ephemeral port whose engine writes to real sockets.
struct LiveServer {
    addr: SocketAddr,
    realtime: RealtimeEngine,
}

impl LiveServer {
    async fn start() -> Self {
        Self::start_with(helpers::config()).await
    }

    async fn start_with(config: docrelay_core::config::AppConfig) -> Self {
        let stores = Stores::memory();
        let realtime = RealtimeEngine::new(
            config.realtime.clone(),
            &stores,
            helpers::directory(),
            &config.directory.admin_role,
        );
        let state = docrelay_api::AppState::new(config, stores, realtime.clone());
        let app = docrelay_api::build_router(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, realtime }
    }

    /// Connect as `user` and wait until the server has registered the socket.
    async fn connect(&self, user: &str) -> Client {
        let url = format!("ws://{}/ws?user_id={}", self.addr, user);
        let (client, _) = connect_async(url).await.expect("WebSocket handshake failed");

        let user_id = UserId::new(user);
        tokio::time::timeout(PUSH_TIMEOUT, async {
            while !self.realtime.connections.is_user_connected(&user_id) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("Connection was never registered");
        client
    }
}

async fn send(client: &mut Client, frame: Value) {
    client
        .send(Message::text(frame.to_string()))
        .await
        .expect("Failed to send frame");
}

async fn next_envelope(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(PUSH_TIMEOUT, client.next())
            .await
            .expect("Timed out waiting for a frame")
            .expect("Socket closed")
            .expect("Socket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("Frame is not JSON");
        }
    }
}

#[tokio::test]
async fn test_ws_upgrade_without_upgrade_headers() {
    let app = TestApp::new();

    let response = app.request("GET", "/ws?user_id=A", None).await;
    assert!(
        response.status.is_client_error(),
        "Expected a 4xx, got {}",
        response.status
    );
}

#[tokio::test]
async fn test_ws_blank_user_is_rejected() {
    let server = LiveServer::start().await;

    let err = connect_async(format!("ws://{}/ws?user_id=%20", server.addr))
        .await
        .unwrap_err();
    match err {
        tokio_tungstenite::tungstenite::Error::Http(response) => {
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
        other => panic!("Unexpected handshake error: {other}"),
    }
}

#[tokio::test]
async fn test_document_viewed_frame_reaches_admin_socket() {
    let server = LiveServer::start().await;
    let mut admin = server.connect("adm").await;
    let mut viewer = server.connect("A").await;

    send(
        &mut viewer,
        json!({"type": "action", "typeMessage": "DOCUMENT8Viewed", "documentId": "4"}),
    )
    .await;

    let envelope = next_envelope(&mut admin).await;
    assert_eq!(envelope["destination"], "/queue/action");
    assert_eq!(envelope["payload"]["typeMessage"], "GETBOOKSVIWER");
    assert_eq!(envelope["payload"]["senderId"], "A");
    assert_eq!(envelope["payload"]["receiverId"], "adm");
    assert_eq!(envelope["payload"]["user"]["documentId"], 4);
    assert_eq!(envelope["payload"]["user"]["isBlocked"], false);
}

#[tokio::test]
async fn test_notification_frames_round_trip() {
    let server = LiveServer::start().await;
    let mut client = server.connect("u1").await;

    send(&mut client, json!({"type": "notifications"})).await;
    let envelope = next_envelope(&mut client).await;
    assert_eq!(envelope["destination"], "/queue/notifications");
    assert_eq!(envelope["payload"], json!([]));

    // Malformed frames are ignored and the socket stays usable.
    client.send(Message::text("{oops")).await.unwrap();
    send(&mut client, json!({"type": "mark_all_read"})).await;
    let envelope = next_envelope(&mut client).await;
    assert_eq!(envelope["payload"], json!([]));
}

async fn assert_closed(client: &mut Client) {
    let ended = tokio::time::timeout(PUSH_TIMEOUT, async {
        loop {
            match client.next().await {
                None | Some(Err(_)) | Some(Ok(Message::Close(_))) => return,
                Some(Ok(_)) => {}
            }
        }
    })
    .await;
    assert!(ended.is_ok(), "Socket stayed open");
}

#[tokio::test]
async fn test_connection_over_limit_evicts_oldest_socket() {
    let mut config = helpers::config();
    config.realtime.max_connections_per_user = 1;
    let server = LiveServer::start_with(config).await;

    let mut oldest = server.connect("u1").await;
    let (mut newest, _) = connect_async(format!("ws://{}/ws?user_id=u1", server.addr))
        .await
        .expect("WebSocket handshake failed");

    assert_closed(&mut oldest).await;
    assert_eq!(server.realtime.connections.connection_count(), 1);

    send(&mut newest, json!({"type": "notifications"})).await;
    let envelope = next_envelope(&mut newest).await;
    assert_eq!(envelope["destination"], "/queue/notifications");
}

#[tokio::test]
async fn test_engine_shutdown_closes_sockets() {
    let server = LiveServer::start().await;
    let mut client = server.connect("u1").await;

    server.realtime.shutdown();

    assert_closed(&mut client).await;
    assert_eq!(server.realtime.connections.connection_count(), 0);
}
