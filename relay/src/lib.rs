//! Single-connection relay to the playground chat socket.
//!
//! DESIGN
//! ======
//! `ConnectionManager` owns at most one live connection. Each connection is
//! driven by its own socket task (see `socket.rs`) that authenticates with a
//! credential frame, relays every inbound frame as a [`RelayEvent`], and
//! drains a per-connection outbound queue. The manager itself never touches
//! the socket; it only validates the endpoint, spawns the task, and reads the
//! task's published [`ConnectionState`].
//!
//! LIFECYCLE
//! =========
//! `absent → connecting → open → closed`. `closed` is terminal for a
//! connection: a later `connect` starts a new one with a fresh
//! [`ConnectionId`]. Any previous connection is closed before the new one is
//! assigned.

mod socket;

use std::fmt;
use std::time::Duration;

use frames::{Credential, InboundMessage, Outbound};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use uuid::Uuid;

/// How long [`ConnectionManager::shutdown`] waits for the close handshake.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

// =============================================================================
// TYPES
// =============================================================================

/// Error returned when a connection attempt cannot be initiated.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The endpoint is not a usable `ws://` or `wss://` URL.
    #[error("invalid websocket endpoint {0}")]
    InvalidEndpoint(String),
    /// `connect` was called outside a Tokio runtime.
    #[error("no async runtime available to drive the connection")]
    NoRuntime,
}

/// Lifecycle of the managed connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// No connection has been requested yet.
    Absent,
    /// Handshake or credential send in flight.
    Connecting,
    /// Credential sent; commands are accepted.
    Open,
    /// Closed by the peer, by a transport error, or by teardown. Terminal.
    Closed,
}

impl ConnectionState {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }

    /// Whether the connection may still open or relay frames.
    #[must_use]
    pub fn is_live(self) -> bool {
        matches!(self, Self::Connecting | Self::Open)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifies one connection attempt. Events from a replaced connection keep
/// their old id so consumers can tell them apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Everything the relay reports to its consumer, in transport order.
#[derive(Clone, Debug, PartialEq)]
pub enum RelayEvent {
    /// The connection moved to a new lifecycle state.
    Status { connection: ConnectionId, state: ConnectionState },
    /// An inbound frame, parsed and unmodified.
    Message { connection: ConnectionId, message: InboundMessage },
}

impl RelayEvent {
    #[must_use]
    pub fn connection(&self) -> ConnectionId {
        match self {
            Self::Status { connection, .. } | Self::Message { connection, .. } => *connection,
        }
    }
}

// =============================================================================
// CONNECTION MANAGER
// =============================================================================

/// Handle to the socket task of one connection.
struct Connection {
    id: ConnectionId,
    state: watch::Receiver<ConnectionState>,
    outbound: mpsc::UnboundedSender<Outbound>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl Connection {
    fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    fn close(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
    }
}

/// Owns the single relay connection for the process.
pub struct ConnectionManager {
    endpoint: String,
    events: mpsc::UnboundedSender<RelayEvent>,
    current: Option<Connection>,
}

impl ConnectionManager {
    /// Create a manager for `endpoint` and the receiver its events flow into.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> (Self, mpsc::UnboundedReceiver<RelayEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let manager = Self { endpoint: endpoint.into(), events, current: None };
        (manager, rx)
    }

    /// Start a connection and report whether the attempt was initiated.
    ///
    /// The open itself completes asynchronously; its outcome arrives as a
    /// [`RelayEvent::Status`]. Initiation errors are logged.
    pub fn connect(&mut self, credential: Credential) -> bool {
        match self.try_connect(credential) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, endpoint = %self.endpoint, "relay: connect failed");
                false
            }
        }
    }

    /// Start a connection, closing any previous one first.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::InvalidEndpoint`] when the endpoint is not a
    /// `ws`/`wss` URL, and [`RelayError::NoRuntime`] outside a Tokio runtime.
    /// The previous connection is left untouched on error.
    pub fn try_connect(&mut self, credential: Credential) -> Result<ConnectionId, RelayError> {
        let request = self
            .endpoint
            .as_str()
            .into_client_request()
            .map_err(|e| RelayError::InvalidEndpoint(format!("{}: {e}", self.endpoint)))?;
        if !matches!(request.uri().scheme_str(), Some("ws" | "wss")) {
            return Err(RelayError::InvalidEndpoint(self.endpoint.clone()));
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| RelayError::NoRuntime)?;

        self.close();

        let id = ConnectionId::new();
        let (state_tx, state_rx) = watch::channel(ConnectionState::Connecting);
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let _ = self.events.send(RelayEvent::Status { connection: id, state: ConnectionState::Connecting });
        tracing::info!(connection = %id, endpoint = %self.endpoint, "relay: connecting");

        let socket = socket::SocketTask {
            id,
            state: state_tx,
            events: self.events.clone(),
            outbound: outbound_rx,
            shutdown: shutdown_rx,
        };
        let task = runtime.spawn(socket::run(socket, request, credential));

        self.current = Some(Connection {
            id,
            state: state_rx,
            outbound: outbound_tx,
            shutdown: Some(shutdown_tx),
            task,
        });
        Ok(id)
    }

    /// Forward a user command. Returns `false` unless the connection is open.
    pub fn send_command(&self, command: &str) -> bool {
        let Some(conn) = self.current.as_ref().filter(|c| c.state() == ConnectionState::Open) else {
            tracing::debug!("relay: send refused, no open connection");
            return false;
        };
        conn.outbound.send(Outbound::command(command)).is_ok()
    }

    /// Ask the current connection to close. No-op when there is none.
    pub fn close(&mut self) {
        if let Some(mut conn) = self.current.take() {
            tracing::info!(connection = %conn.id, "relay: closing connection");
            conn.close();
        }
    }

    /// Close the current connection and wait for its socket task to finish,
    /// so the close frame is written before the runtime goes away.
    ///
    /// The task is aborted if it has not exited after `SHUTDOWN_GRACE`.
    pub async fn shutdown(&mut self) {
        let Some(mut conn) = self.current.take() else {
            return;
        };
        tracing::info!(connection = %conn.id, "relay: shutting down connection");
        conn.close();
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut conn.task).await.is_err() {
            tracing::warn!(connection = %conn.id, "relay: close handshake timed out");
            conn.task.abort();
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.current.as_ref().map_or(ConnectionState::Absent, Connection::state)
    }

    #[must_use]
    pub fn current_id(&self) -> Option<ConnectionId> {
        self.current.as_ref().map(|c| c.id)
    }

    /// Whether `id` names the connection currently held by the manager.
    #[must_use]
    pub fn is_current(&self, id: ConnectionId) -> bool {
        self.current_id() == Some(id)
    }

    /// Whether the socket task of the current connection has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current.as_ref().is_none_or(|c| c.task.is_finished())
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
