use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::types::{ClientMessage, ServerMessage};
use crate::AppState;

/// WebSocket upgrade handler.
pub async fn ws_handler(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: AppState) {
    let (mut sender, mut receiver) = socket.split();

    // Channel for pushing hub broadcasts to this client
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();

    let client_id = state.hub.register(tx);
    info!("WebSocket client connected: {}", client_id);

    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(Message::Text(msg)).await.is_err() {
                break;
            }
        }
    });

    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => {
                debug!("Received message from {}: {}", client_id, text);
                handle_message(&state, client_id, &text);
            }
            Ok(Message::Close(_)) => {
                info!("WebSocket client disconnecting: {}", client_id);
                break;
            }
            Ok(Message::Ping(_)) => {
                // Pong is handled automatically by axum
            }
            Err(e) => {
                error!("WebSocket error for {}: {}", client_id, e);
                break;
            }
            _ => {}
        }
    }

    state.hub.unregister(client_id);
    send_task.abort();
    info!("WebSocket client disconnected: {}", client_id);
}

fn handle_message(state: &AppState, client_id: Uuid, text: &str) {
    let msg: ClientMessage = match serde_json::from_str(text) {
        Ok(m) => m,
        Err(e) => {
            send_message(
                state,
                client_id,
                &ServerMessage::Error {
                    error: format!("Invalid message: {}", e),
                },
            );
            return;
        }
    };

    match msg {
        ClientMessage::Subscribe { channels } => {
            let subscribed = state.hub.subscribe(client_id, &channels);
            debug!("Client {} subscribed to: {:?}", client_id, subscribed);
            send_message(state, client_id, &ServerMessage::Subscribed { channels: subscribed });
        }
        ClientMessage::Unsubscribe { channels } => {
            let unsubscribed = state.hub.unsubscribe(client_id, &channels);
            debug!("Client {} unsubscribed from: {:?}", client_id, unsubscribed);
            send_message(
                state,
                client_id,
                &ServerMessage::Unsubscribed { channels: unsubscribed },
            );
        }
    }
}

fn send_message(state: &AppState, client_id: Uuid, msg: &ServerMessage) {
    if let Ok(json) = serde_json::to_string(msg) {
        if let Some(client) = state.hub.clients.get(&client_id) {
            let _ = client.tx.send(json);
        }
    }
}
