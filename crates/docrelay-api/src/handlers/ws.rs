//! WebSocket upgrade handler.

use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Query, State, WebSocketUpgrade};
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tracing::{debug, info, warn};

use docrelay_core::error::AppError;
use docrelay_core::types::UserId;

use crate::error::ApiError;
use crate::state::AppState;

/// How long a closing socket may spend writing frames already queued for it.
const OUTBOUND_FLUSH_TIMEOUT: Duration = Duration::from_secs(1);

/// Query parameters of the upgrade request.
#[derive(Debug, serde::Deserialize)]
pub struct WsQuery {
    /// Connecting user, asserted by the upstream token validator.
    pub user_id: String,
}

/// GET /ws?user_id={id}: WebSocket upgrade
pub async fn ws_upgrade(
    State(state): State<AppState>,
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
) -> Result<Response, ApiError> {
    let user_id = UserId::new(query.user_id);
    if user_id.is_blank() {
        return Err(AppError::validation("user_id is required").into());
    }

    Ok(ws.on_upgrade(move |socket| handle_ws_connection(state, user_id, socket)))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, user_id: UserId, socket: WebSocket) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (handle, mut outbound_rx) = state.realtime.connections.register(user_id.clone());
    let conn_id = handle.id;
    let mut shutdown = state.realtime.shutdown_receiver();

    info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection established");

    // Ends once every sender is gone, after writing what is still queued.
    let mut outbound_task = tokio::spawn(async move {
        while let Some(frame) = outbound_rx.recv().await {
            if ws_tx.send(Message::Text(frame.into())).await.is_err() {
                return;
            }
        }
        let _ = ws_tx.send(Message::Close(None)).await;
    });

    loop {
        tokio::select! {
            incoming = ws_rx.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    state.realtime.handle_frame(&user_id, text.as_str()).await;
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = handle.closed() => {
                info!(conn_id = %conn_id, user_id = %user_id, "Connection closed by server");
                break;
            }
            _ = shutdown.recv() => break,
        }
    }

    state.realtime.connections.unregister(&conn_id);
    drop(handle);
    if tokio::time::timeout(OUTBOUND_FLUSH_TIMEOUT, &mut outbound_task)
        .await
        .is_err()
    {
        debug!(conn_id = %conn_id, "Outbound queue not flushed in time");
        outbound_task.abort();
    }

    info!(conn_id = %conn_id, user_id = %user_id, "WebSocket connection closed");
}
