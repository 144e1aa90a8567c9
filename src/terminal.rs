//! Headless shell: relayed messages as JSON lines, window requests as logs.

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use frames::InboundMessage;
use relay::ConnectionState;

use crate::shell::{Geometry, MessageSink, WindowControl};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowState {
    pub geometry: Geometry,
    pub minimized: bool,
}

/// Writes one JSON line per relayed message to `out` and tracks the window
/// state a graphical shell would have.
pub struct TerminalShell<W> {
    out: Mutex<W>,
    window: Mutex<WindowState>,
}

impl<W: Write> TerminalShell<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
            window: Mutex::new(WindowState { geometry: Geometry::INITIAL, minimized: false }),
        }
    }

    #[must_use]
    pub fn window(&self) -> WindowState {
        *self.window.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write> MessageSink for TerminalShell<W> {
    fn deliver(&self, message: &InboundMessage) {
        let mut out = self.out.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(e) = writeln!(out, "{message}").and_then(|()| out.flush()) {
            tracing::warn!(error = %e, "terminal: failed to write message");
        }
    }

    fn status(&self, state: ConnectionState) {
        tracing::info!(%state, "terminal: connection status");
    }
}

impl<W: Write> WindowControl for TerminalShell<W> {
    fn set_geometry(&self, geometry: Geometry) {
        let mut window = self.window.lock().unwrap_or_else(PoisonError::into_inner);
        window.geometry = geometry;
        window.minimized = false;
        tracing::info!(width = geometry.width, height = geometry.height, "window: resized");
    }

    fn minimize(&self) {
        self.window.lock().unwrap_or_else(PoisonError::into_inner).minimized = true;
        tracing::info!("window: minimized");
    }
}

#[cfg(test)]
#[path = "terminal_test.rs"]
mod tests;
