// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! WebSocket server for live reload notifications.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Message pushed to connected browsers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Notification {
    /// The stylesheet was rebuilt; swap it without reloading.
    Css,
    /// Pages changed; reload the document.
    Reload,
}

impl Notification {
    /// JSON text frame payload.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Sender side of the notification channel.
pub type NotificationSender = Arc<broadcast::Sender<Notification>>;

/// Creates the notification channel.
pub fn channel() -> NotificationSender {
    let (tx, _) = broadcast::channel(16);
    Arc::new(tx)
}

/// Router serving the live reload socket at `/`.
pub fn router(tx: NotificationSender) -> Router {
    Router::new().route("/", get(upgrade)).with_state(tx)
}

async fn upgrade(ws: WebSocketUpgrade, State(tx): State<NotificationSender>) -> impl IntoResponse {
    let rx = tx.subscribe();
    ws.on_upgrade(move |socket| handle_websocket(socket, rx))
}

/// Forwards notifications to one client until either side goes away.
pub async fn handle_websocket(mut socket: WebSocket, mut rx: broadcast::Receiver<Notification>) {
    tracing::debug!("Live reload client connected");
    loop {
        tokio::select! {
            result = rx.recv() => {
                match result {
                    Ok(notification) => {
                        let payload = match notification.to_json() {
                            Ok(payload) => payload,
                            Err(e) => {
                                tracing::error!("Failed to encode {:?}: {}", notification, e);
                                continue;
                            }
                        };
                        if socket.send(Message::Text(payload)).await.is_err() {
                            // Client disconnected
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!("Live reload client lagged by {} messages", skipped);
                        continue;
                    }
                }
            }
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    // Client messages carry no meaning
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }
    tracing::debug!("Live reload client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        assert_eq!(Notification::Css.to_json().unwrap(), r#"{"type":"css"}"#);
        assert_eq!(Notification::Reload.to_json().unwrap(), r#"{"type":"reload"}"#);
        let parsed: Notification = serde_json::from_str(r#"{"type":"css"}"#).unwrap();
        assert_eq!(parsed, Notification::Css);
    }

    #[test]
    fn test_send_without_clients() {
        let tx = channel();
        assert!(tx.send(Notification::Reload).is_err());
        let mut rx = tx.subscribe();
        tx.send(Notification::Css).unwrap();
        assert_eq!(rx.try_recv().unwrap(), Notification::Css);
    }
}
