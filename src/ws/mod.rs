use axum::{
    extract::{
        ws::{rejection::WebSocketUpgradeRejection, Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    response::{IntoResponse, Response},
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;

use crate::broadcast::Subscriber;
use crate::state::AppState;

/// WebSocket upgrade handler for GET /ws/games/{id}
///
/// The game lookup runs before the upgrade is validated, so an unknown game
/// is a 404 even for a well-formed handshake.
pub async fn ws_handler(
    ws: Result<WebSocketUpgrade, WebSocketUpgradeRejection>,
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    if let Err(e) = state.sessions.get(&id).await {
        return e.into_response();
    }

    let ws = match ws {
        Ok(ws) => ws,
        Err(rejection) => {
            tracing::debug!("Rejected WebSocket upgrade for game {}: {}", id, rejection);
            return rejection.into_response();
        }
    };

    tracing::info!("WebSocket connection request for game {}", id);
    ws.on_upgrade(move |socket| handle_socket(socket, id, state))
        .into_response()
}

/// Handle one subscriber connection.
///
/// A single writer task drains the subscriber's queue, so broadcast frames
/// reach the socket one at a time and in order. The read half only watches
/// for the connection going away.
async fn handle_socket(socket: WebSocket, code: String, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let (subscriber, mut rx) = Subscriber::channel();
    let subscriber_id = subscriber.id.clone();

    if let Err(e) = state.subscribe(&code, subscriber).await {
        tracing::warn!("Subscribe to game {} failed: {}", code, e);
        let _ = sender.send(Message::Close(None)).await;
        return;
    }

    let writer_id = subscriber_id.clone();
    let mut writer = tokio::spawn(async move {
        while let Some(frame) = rx.recv().await {
            if let Err(e) = sender.send(Message::Text(frame.to_string().into())).await {
                tracing::warn!("Write to subscriber {} failed: {}", writer_id, e);
                break;
            }
        }
    });

    loop {
        tokio::select! {
            _ = &mut writer => break,

            ws_msg = receiver.next() => {
                match ws_msg {
                    Some(Ok(Message::Close(_))) | None => {
                        tracing::info!("WebSocket closed");
                        break;
                    }
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Ignoring client message on subscriber socket: {}", text);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        tracing::error!("WebSocket error: {}", e);
                        break;
                    }
                }
            }
        }
    }

    writer.abort();
    if let Err(e) = state.unsubscribe(&code, &subscriber_id).await {
        tracing::warn!("Unsubscribe from game {} failed: {}", code, e);
    }
    tracing::info!("Subscriber {} left game {}", subscriber_id, code);
}
