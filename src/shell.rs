//! Presentation-side policy for relayed events.
//!
//! DESIGN
//! ======
//! The relay hands over a typed event stream and knows nothing about windows.
//! This module is the subscriber: it forwards every message to a
//! [`MessageSink`] unchanged, then asks the [`WindowControl`] for the geometry
//! the message calls for. Today only `stream_url` messages change geometry.

use frames::InboundMessage;
use relay::{ConnectionState, RelayEvent};

// =============================================================================
// GEOMETRY
// =============================================================================

/// Window size in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub width: u32,
    pub height: u32,
}

impl Geometry {
    /// Compact bar shown at launch.
    pub const INITIAL: Self = Self { width: 400, height: 80 };
    /// Room for status once a connection attempt starts.
    pub const CONNECTING: Self = Self { width: 400, height: 110 };
    /// Large enough to view a live stream.
    pub const STREAM: Self = Self { width: 800, height: 702 };
}

/// Geometry an inbound message asks for, if any.
#[must_use]
pub fn geometry_for(message: &InboundMessage) -> Option<Geometry> {
    message.is_stream_url().then_some(Geometry::STREAM)
}

// =============================================================================
// SHELL SURFACES
// =============================================================================

/// Receives relayed messages, one call per inbound frame.
pub trait MessageSink {
    fn deliver(&self, message: &InboundMessage);

    /// Connection lifecycle changes. Ignored unless the sink cares.
    fn status(&self, _state: ConnectionState) {}
}

/// Window-control requests the shell can honor.
pub trait WindowControl {
    fn set_geometry(&self, geometry: Geometry);
    fn minimize(&self);
}

/// Route one relay event to the shell surfaces.
///
/// Messages are delivered before any geometry change they trigger.
pub fn dispatch_event<S, W>(event: &RelayEvent, sink: &S, window: &W)
where
    S: MessageSink + ?Sized,
    W: WindowControl + ?Sized,
{
    match event {
        RelayEvent::Message { message, .. } => {
            sink.deliver(message);
            if let Some(geometry) = geometry_for(message) {
                window.set_geometry(geometry);
            }
        }
        RelayEvent::Status { state, .. } => sink.status(*state),
    }
}

#[cfg(test)]
pub mod test_helpers {
    use std::sync::Mutex;

    use super::*;

    /// Everything a [`RecordingShell`] was asked to do, in order.
    #[derive(Clone, Debug, PartialEq)]
    pub enum Call {
        Deliver(serde_json::Value),
        Status(ConnectionState),
        Geometry(Geometry),
        Minimize,
    }

    #[derive(Default)]
    pub struct RecordingShell {
        calls: Mutex<Vec<Call>>,
    }

    impl RecordingShell {
        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().expect("calls mutex should lock").clone()
        }

        pub fn geometry_calls(&self) -> Vec<Geometry> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Geometry(g) => Some(g),
                    _ => None,
                })
                .collect()
        }

        pub fn statuses(&self) -> Vec<ConnectionState> {
            self.calls()
                .into_iter()
                .filter_map(|c| match c {
                    Call::Status(s) => Some(s),
                    _ => None,
                })
                .collect()
        }

        fn record(&self, call: Call) {
            self.calls.lock().expect("calls mutex should lock").push(call);
        }
    }

    impl MessageSink for RecordingShell {
        fn deliver(&self, message: &InboundMessage) {
            self.record(Call::Deliver(message.as_value().clone()));
        }

        fn status(&self, state: ConnectionState) {
            self.record(Call::Status(state));
        }
    }

    impl WindowControl for RecordingShell {
        fn set_geometry(&self, geometry: Geometry) {
            self.record(Call::Geometry(geometry));
        }

        fn minimize(&self) {
            self.record(Call::Minimize);
        }
    }
}

#[cfg(test)]
#[path = "shell_test.rs"]
mod tests;
