//! WebSocket signaling gateway.
//!
//! The `/ws` endpoint upgrades to a WebSocket carrying JSON text frames.
//! Each frame names a channel and a destination, mirroring the four
//! channel-scoped inbound destinations (`signal`, `chat`, `chat_record`,
//! `access`) plus explicit `subscribe`/`unsubscribe` for the channel's
//! broadcast stream.
//!
//! Authentication is lenient: a bearer token (header or `?token=` query
//! parameter) attaches an identity to the connection, but a missing or
//! invalid token still gets a connection. Malformed frames are answered
//! with an error frame and never tear the connection down.

use std::collections::HashMap;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use haven_types::channel::ChannelId;
use haven_types::identity::Identity;
use haven_types::signal::{AccessRequest, ChatMessageRequest, ChatRecordRequest, SignalRequest};

use haven_core::identity::IdentityValidator;

use crate::state::AppState;

/// Outbound frames buffered per connection before sends block.
const OUTBOUND_BUFFER: usize = 64;

/// Inbound frame from a WebSocket client.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsFrame {
    /// Start receiving a channel's broadcasts.
    Subscribe { channel: ChannelId },
    /// Stop receiving a channel's broadcasts.
    Unsubscribe { channel: ChannelId },
    /// Signaling event for a channel. The body may itself name a target
    /// channel (`accepted` moves the user there), so it stays nested
    /// instead of flattened.
    Signal {
        channel: ChannelId,
        body: SignalRequest,
    },
    /// Plain chat message, relayed to subscribers.
    Chat {
        channel: ChannelId,
        body: ChatMessageRequest,
    },
    /// Transcript-recording message.
    ChatRecord {
        channel: ChannelId,
        body: ChatRecordRequest,
    },
    /// Access request echoed to the channel for counselor review.
    Access {
        channel: ChannelId,
        body: AccessRequest,
    },
    /// Keep-alive ping. Server responds with `{"type":"pong"}`.
    Ping,
}

/// Broadcast envelope: the channel plus the destination's response body.
#[derive(Serialize)]
struct Broadcast<T> {
    channel: ChannelId,
    #[serde(flatten)]
    payload: T,
}

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

/// Upgrade an HTTP request to a signaling WebSocket connection.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    headers: HeaderMap,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let identity = authenticate(&state, &query, &headers).await;
    ws.on_upgrade(move |socket| handle_ws_connection(socket, state, identity))
}

/// Resolve the connection's identity from the bearer header or the
/// `token` query parameter. Lenient: any failure yields `None`.
async fn authenticate(
    state: &AppState,
    query: &WsQuery,
    headers: &HeaderMap,
) -> Option<Identity> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.trim().to_string())
        .or_else(|| query.token.clone())?;

    match state.tokens.validate(&token).await {
        Ok(Some(identity)) => {
            info!(subject_id = identity.subject_id, role = %identity.role, "connection authenticated");
            Some(identity)
        }
        Ok(None) => {
            warn!("unknown access token; connection proceeds unauthenticated");
            None
        }
        Err(err) => {
            warn!(error = %err, "token validation failed; connection proceeds unauthenticated");
            None
        }
    }
}

/// Core connection loop.
///
/// A per-connection mpsc queue decouples the socket writer from the
/// per-channel forwarder tasks, so any number of subscriptions can feed
/// one socket.
async fn handle_ws_connection(socket: WebSocket, state: AppState, identity: Option<Identity>) {
    let (mut ws_sender, mut ws_receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<String>(OUTBOUND_BUFFER);

    let mut subscriptions: HashMap<ChannelId, JoinHandle<()>> = HashMap::new();

    loop {
        tokio::select! {
            // --- Branch 1: queued broadcasts and replies to the socket ---
            queued = outbound_rx.recv() => {
                match queued {
                    Some(payload) => {
                        if ws_sender.send(Message::Text(payload.into())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }

            // --- Branch 2: frames from the client ---
            frame = ws_receiver.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        process_frame(
                            &text,
                            &state,
                            identity.as_ref(),
                            &outbound_tx,
                            &mut subscriptions,
                        )
                        .await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        debug!(error = %err, "websocket receive error");
                        break;
                    }
                    // Binary and protocol ping/pong frames are ignored.
                    Some(Ok(_)) => {}
                }
            }
        }
    }

    for (channel_id, handle) in subscriptions {
        handle.abort();
        state.hub.prune(channel_id);
    }
    debug!("websocket connection closed");
}

async fn process_frame(
    text: &str,
    state: &AppState,
    identity: Option<&Identity>,
    outbound_tx: &mpsc::Sender<String>,
    subscriptions: &mut HashMap<ChannelId, JoinHandle<()>>,
) {
    let frame: WsFrame = match serde_json::from_str(text) {
        Ok(frame) => frame,
        Err(err) => {
            warn!(raw = %text, error = %err, "malformed websocket frame");
            let error = serde_json::json!({ "type": "error", "message": "malformed frame" });
            let _ = outbound_tx.send(error.to_string()).await;
            return;
        }
    };

    match frame {
        WsFrame::Subscribe { channel } => {
            if subscriptions.contains_key(&channel) {
                return;
            }
            let receiver = state.hub.subscribe(channel);
            let forwarder = spawn_forwarder(channel, receiver, outbound_tx.clone());
            subscriptions.insert(channel, forwarder);
            debug!(channel, "subscribed");
        }
        WsFrame::Unsubscribe { channel } => {
            if let Some(handle) = subscriptions.remove(&channel) {
                handle.abort();
                state.hub.prune(channel);
                debug!(channel, "unsubscribed");
            }
        }
        WsFrame::Signal { channel, body } => {
            debug!(
                channel,
                event = %body.event,
                subject_id = identity.map(|i| i.subject_id),
                "signal received"
            );
            let response = state.coordinator.handle_signal(channel, &body).await;
            publish(state, channel, &response);
        }
        WsFrame::Chat { channel, body } => {
            let response = state.coordinator.handle_chat(channel, body).await;
            publish(state, channel, &response);
        }
        WsFrame::ChatRecord { channel, body } => {
            let response = state.coordinator.handle_chat_record(channel, body).await;
            publish(state, channel, &response);
        }
        WsFrame::Access { channel, body } => {
            let response = state.coordinator.handle_access(channel, body).await;
            publish(state, channel, &response);
        }
        WsFrame::Ping => {
            let _ = outbound_tx.send(r#"{"type":"pong"}"#.to_string()).await;
        }
    }
}

/// Serialize a response into the broadcast envelope and publish it to
/// every subscriber of the channel.
fn publish<T: Serialize>(state: &AppState, channel: ChannelId, payload: &T) {
    match serde_json::to_string(&Broadcast { channel, payload }) {
        Ok(json) => state.hub.publish(channel, json),
        Err(err) => warn!(channel, error = %err, "failed to serialize broadcast"),
    }
}

/// Forward one channel's broadcasts into the connection's outbound
/// queue until the subscription is dropped.
fn spawn_forwarder(
    channel: ChannelId,
    mut receiver: broadcast::Receiver<String>,
    outbound_tx: mpsc::Sender<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match receiver.recv().await {
                Ok(payload) => {
                    if outbound_tx.send(payload).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!(channel, skipped = n, "slow subscriber lagged, skipping broadcasts");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_frame_parses_nested_body() {
        let frame: WsFrame = serde_json::from_str(
            r#"{"type":"signal","channel":42,"body":{"event":"join","user_id":7}}"#,
        )
        .unwrap();
        match frame {
            WsFrame::Signal { channel, body } => {
                assert_eq!(channel, 42);
                assert_eq!(body.event, "join");
                assert_eq!(body.user_id, 7);
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn accepted_signal_carries_target_channel() {
        let frame: WsFrame = serde_json::from_str(
            r#"{"type":"signal","channel":42,"body":{"event":"accepted","user_id":7,"channel":10001}}"#,
        )
        .unwrap();
        match frame {
            WsFrame::Signal { channel, body } => {
                assert_eq!(channel, 42);
                assert_eq!(body.channel, Some(10001));
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn chat_record_frame_parses() {
        let frame: WsFrame = serde_json::from_str(
            r#"{"type":"chat_record","channel":42,"body":{"event":"record_send","role":"ROLE_USER",
                "content":"hi","user_id":7,"nickname":"jamie","current_time":"2025-04-01T10:00:00"}}"#,
        )
        .unwrap();
        match frame {
            WsFrame::ChatRecord { channel, body } => {
                assert_eq!(channel, 42);
                assert_eq!(body.role, "ROLE_USER");
            }
            other => panic!("unexpected frame: {other:?}"),
        }
    }

    #[test]
    fn subscribe_and_ping_frames_parse() {
        assert!(matches!(
            serde_json::from_str::<WsFrame>(r#"{"type":"subscribe","channel":42}"#).unwrap(),
            WsFrame::Subscribe { channel: 42 }
        ));
        assert!(matches!(
            serde_json::from_str::<WsFrame>(r#"{"type":"ping"}"#).unwrap(),
            WsFrame::Ping
        ));
    }

    #[test]
    fn unknown_frame_type_is_err() {
        assert!(serde_json::from_str::<WsFrame>(r#"{"type":"explode"}"#).is_err());
    }

    #[test]
    fn broadcast_envelope_flattens_payload() {
        let payload = haven_types::signal::SignalResponse {
            channel_id: 42,
            user_id: 7,
            event: "join".to_string(),
        };
        let json = serde_json::to_value(Broadcast {
            channel: 42,
            payload,
        })
        .unwrap();
        assert_eq!(json["channel"], 42);
        assert_eq!(json["event"], "join");
        assert_eq!(json["user_id"], 7);
    }
}
