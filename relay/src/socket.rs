//! Socket task for one relay connection.
//!
//! Handshake, then one credential frame, then a `select!` loop:
//! - Inbound frames → decode → [`RelayEvent::Message`]
//! - Queued outbound frames → write to the socket
//! - Shutdown signal → close frame, exit
//!
//! Every exit path publishes `closed` exactly once.

use frames::{CodecError, Credential, InboundMessage, Outbound};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::client::Request;

use crate::{ConnectionId, ConnectionState, RelayEvent};

pub(crate) struct SocketTask {
    pub(crate) id: ConnectionId,
    pub(crate) state: watch::Sender<ConnectionState>,
    pub(crate) events: mpsc::UnboundedSender<RelayEvent>,
    pub(crate) outbound: mpsc::UnboundedReceiver<Outbound>,
    pub(crate) shutdown: oneshot::Receiver<()>,
}

impl SocketTask {
    fn transition(&self, state: ConnectionState) {
        self.state.send_replace(state);
        let _ = self.events.send(RelayEvent::Status { connection: self.id, state });
    }

    fn relay(&self, decoded: Result<InboundMessage, CodecError>) {
        match decoded {
            Ok(message) => {
                tracing::debug!(connection = %self.id, kind = message.kind(), %message, "relay: inbound");
                let _ = self.events.send(RelayEvent::Message { connection: self.id, message });
            }
            Err(e) => {
                tracing::warn!(connection = %self.id, error = %e, "relay: dropping malformed frame");
            }
        }
    }
}

pub(crate) async fn run(mut task: SocketTask, request: Request, credential: Credential) {
    let id = task.id;

    let connected = tokio::select! {
        result = connect_async(request) => result,
        _ = &mut task.shutdown => {
            tracing::info!(connection = %id, "relay: closed before open");
            task.transition(ConnectionState::Closed);
            return;
        }
    };

    let mut stream = match connected {
        Ok((stream, _)) => stream,
        Err(e) => {
            tracing::warn!(connection = %id, error = %e, "relay: websocket connect failed");
            task.transition(ConnectionState::Closed);
            return;
        }
    };

    let hello = frames::encode_outbound(&credential.into_frame());
    if let Err(e) = stream.send(Message::text(hello)).await {
        tracing::warn!(connection = %id, error = %e, "relay: credential send failed");
        task.transition(ConnectionState::Closed);
        return;
    }

    tracing::info!(connection = %id, "relay: connected");
    task.transition(ConnectionState::Open);

    loop {
        tokio::select! {
            msg = stream.next() => {
                let Some(msg) = msg else { break };
                match msg {
                    Ok(msg) => {
                        if matches!(msg, Message::Close(_)) {
                            tracing::info!(connection = %id, "relay: closed by peer");
                            break;
                        }
                        if let Some(decoded) = decode_message(&msg) {
                            task.relay(decoded);
                        }
                    }
                    Err(e) => {
                        tracing::warn!(connection = %id, error = %e, "relay: websocket error");
                        break;
                    }
                }
            }
            Some(frame) = task.outbound.recv() => {
                let text = frames::encode_outbound(&frame);
                if let Err(e) = stream.send(Message::text(text)).await {
                    tracing::warn!(connection = %id, error = %e, "relay: send failed");
                    break;
                }
            }
            _ = &mut task.shutdown => {
                let _ = stream.close(None).await;
                break;
            }
        }
    }

    tracing::info!(connection = %id, "relay: disconnected");
    task.transition(ConnectionState::Closed);
}

/// Decode a data frame. Control frames yield `None`.
pub(crate) fn decode_message(msg: &Message) -> Option<Result<InboundMessage, CodecError>> {
    match msg {
        Message::Text(text) => Some(frames::decode_inbound(text.as_str())),
        Message::Binary(bytes) => Some(frames::decode_inbound_bytes(bytes)),
        Message::Ping(_) | Message::Pong(_) | Message::Close(_) | Message::Frame(_) => None,
    }
}

#[cfg(test)]
#[path = "socket_test.rs"]
mod tests;
