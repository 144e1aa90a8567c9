//! Wire model and JSON text codec for the playground chat socket.
//!
//! Every frame on the socket is a UTF-8 JSON object. Outbound frames come in
//! exactly two shapes (the one-time credential and user commands) and are
//! encoded here so their byte layout stays fixed. Inbound frames are kept as
//! a flexible `serde_json::Value`; the only field the shell ever interprets
//! is `type`.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Inbound `type` tag announcing a live stream URL.
pub const STREAM_URL: &str = "stream_url";

/// Error returned by [`decode_inbound`] and [`decode_inbound_bytes`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The frame text is not valid JSON.
    #[error("failed to parse JSON frame: {0}")]
    Json(#[from] serde_json::Error),
    /// A binary frame did not carry UTF-8 text.
    #[error("binary frame is not UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    /// The frame parsed, but is not a JSON object.
    #[error("frame is not a JSON object")]
    NotAnObject,
}

// =============================================================================
// OUTBOUND
// =============================================================================

/// A frame written by the client.
///
/// Serialized untagged, so each variant produces a single-key object:
/// `{"api_key": ...}` or `{"message": ...}`.
#[derive(Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Outbound {
    /// Authentication payload, sent once right after the socket opens.
    Credential { api_key: String },
    /// A user command, forwarded verbatim.
    Command { message: String },
}

impl Outbound {
    /// Wrap a user command. The text is not validated.
    #[must_use]
    pub fn command(message: impl Into<String>) -> Self {
        Self::Command { message: message.into() }
    }
}

impl fmt::Debug for Outbound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credential { .. } => f.debug_struct("Credential").field("api_key", &"<redacted>").finish(),
            Self::Command { message } => f.debug_struct("Command").field("message", message).finish(),
        }
    }
}

/// Encode an outbound frame as JSON text.
#[must_use]
pub fn encode_outbound(frame: &Outbound) -> String {
    // Both variants are a single string field; serialization cannot fail.
    serde_json::to_string(frame).unwrap_or_default()
}

// =============================================================================
// CREDENTIAL
// =============================================================================

/// The API key sent in the credential frame.
///
/// Consumed by [`Credential::into_frame`] so the secret is not kept around
/// after the single send. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Read the credential from the process environment.
    ///
    /// Returns `None` when the variable is unset or empty.
    #[must_use]
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var).ok().filter(|s| !s.is_empty()).map(Self)
    }

    /// Turn the credential into the frame that carries it.
    #[must_use]
    pub fn into_frame(self) -> Outbound {
        Outbound::Credential { api_key: self.0 }
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

// =============================================================================
// INBOUND
// =============================================================================

/// A parsed inbound frame. Always a JSON object; relayed without modification.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InboundMessage(Value);

impl InboundMessage {
    /// The `type` tag, if present and a string.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.0.get("type").and_then(Value::as_str)
    }

    #[must_use]
    pub fn is_stream_url(&self) -> bool {
        self.kind() == Some(STREAM_URL)
    }

    /// The `url` field of a `stream_url` message.
    #[must_use]
    pub fn stream_url(&self) -> Option<&str> {
        if !self.is_stream_url() {
            return None;
        }
        self.0.get("url").and_then(Value::as_str)
    }

    /// Look up a top-level field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl TryFrom<Value> for InboundMessage {
    type Error = CodecError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if value.is_object() {
            Ok(Self(value))
        } else {
            Err(CodecError::NotAnObject)
        }
    }
}

impl fmt::Display for InboundMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Decode an inbound text frame.
///
/// # Errors
///
/// Returns [`CodecError::Json`] for malformed text and
/// [`CodecError::NotAnObject`] for JSON that is not an object.
pub fn decode_inbound(text: &str) -> Result<InboundMessage, CodecError> {
    let value = serde_json::from_str::<Value>(text)?;
    InboundMessage::try_from(value)
}

/// Decode an inbound binary frame holding UTF-8 JSON text.
///
/// # Errors
///
/// Returns [`CodecError::Utf8`] for non-UTF-8 bytes, otherwise the same
/// errors as [`decode_inbound`].
pub fn decode_inbound_bytes(bytes: &[u8]) -> Result<InboundMessage, CodecError> {
    decode_inbound(std::str::from_utf8(bytes)?)
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
