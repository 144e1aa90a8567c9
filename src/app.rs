//! Application context: the one place the relay connection lives.
//!
//! DESIGN
//! ======
//! `App` owns the `ConnectionManager` and the shell surfaces; nothing else
//! holds a connection reference. Shell requests (`/connect`, commands,
//! `/minimize`) come in through [`App::handle_request`], relay events through
//! [`App::handle_event`]. Events from a connection that has since been
//! replaced are dropped here so the shell only ever sees the live one.
//!
//! SESSION
//! =======
//! [`App::run`] ends on `/quit`, or once input is exhausted and no connection
//! is connecting or open. Closing stdin therefore does not cut off a
//! connection opened with `--connect`. Every exit awaits [`App::shutdown`].

use std::ops::ControlFlow;

use frames::Credential;
use relay::{ConnectionManager, ConnectionState, RelayEvent};
use tokio::io::{AsyncBufRead, Lines};
use tokio::sync::mpsc;

use crate::config::ShellConfig;
use crate::shell::{self, Geometry, MessageSink, WindowControl};

/// One line of shell input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ShellRequest {
    Connect,
    Minimize,
    Quit,
    /// Anything else, forwarded to the remote side. A leading `//` escapes a
    /// literal slash.
    Command(String),
}

impl ShellRequest {
    /// Parse an input line. Blank lines yield `None`.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim_end_matches(['\r', '\n']);
        if line.trim().is_empty() {
            return None;
        }
        let request = match line.trim() {
            "/connect" => Self::Connect,
            "/minimize" => Self::Minimize,
            "/quit" | "/exit" => Self::Quit,
            _ => match line.strip_prefix("//") {
                Some(rest) => Self::Command(format!("/{rest}")),
                None => Self::Command(line.to_owned()),
            },
        };
        Some(request)
    }
}

pub struct App<S> {
    config: ShellConfig,
    relay: ConnectionManager,
    shell: S,
}

impl<S: MessageSink + WindowControl> App<S> {
    /// Build the context and place the window at its launch geometry.
    pub fn new(config: ShellConfig, shell: S) -> (Self, mpsc::UnboundedReceiver<RelayEvent>) {
        let (relay, events) = ConnectionManager::new(config.endpoint.clone());
        shell.set_geometry(Geometry::INITIAL);
        (Self { config, relay, shell }, events)
    }

    #[must_use]
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    #[must_use]
    pub fn shell(&self) -> &S {
        &self.shell
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.relay.state()
    }

    /// Open (or reopen) the relay connection.
    ///
    /// The credential is read from the environment now, not at startup.
    /// Returns whether the attempt was initiated.
    pub fn open_connection(&mut self) -> bool {
        let Some(credential) = Credential::from_env(&self.config.credential_var) else {
            tracing::error!(var = %self.config.credential_var, "app: credential variable is not set");
            return false;
        };
        if !self.relay.connect(credential) {
            return false;
        }
        self.shell.set_geometry(Geometry::CONNECTING);
        true
    }

    /// Forward a command. Returns `false` when no connection is open.
    pub fn send_command(&self, command: &str) -> bool {
        self.relay.send_command(command)
    }

    pub fn minimize(&self) {
        self.shell.minimize();
    }

    /// Apply one relay event to the shell.
    pub fn handle_event(&self, event: &RelayEvent) {
        if !self.relay.is_current(event.connection()) {
            tracing::debug!(connection = %event.connection(), "app: ignoring event from replaced connection");
            return;
        }
        shell::dispatch_event(event, &self.shell, &self.shell);
    }

    /// Act on one line of shell input. `Break` ends the session; teardown is
    /// left to [`App::shutdown`].
    pub fn handle_request(&mut self, request: ShellRequest) -> ControlFlow<()> {
        match request {
            ShellRequest::Connect => {
                self.open_connection();
            }
            ShellRequest::Minimize => self.minimize(),
            ShellRequest::Quit => return ControlFlow::Break(()),
            ShellRequest::Command(command) => {
                if !self.send_command(&command) {
                    tracing::warn!(state = %self.state(), "app: not connected, command dropped");
                }
            }
        }
        ControlFlow::Continue(())
    }

    /// Close the connection and wait until its close frame is written.
    pub async fn shutdown(&mut self) {
        self.relay.shutdown().await;
    }

    /// Drive the session: shell input lines and relay events, until `/quit`
    /// or until input is exhausted with no live connection.
    pub async fn run<R>(&mut self, mut input: Lines<R>, events: &mut mpsc::UnboundedReceiver<RelayEvent>)
    where
        R: AsyncBufRead + Unpin,
    {
        let mut input_open = true;
        loop {
            if !input_open && !self.state().is_live() {
                // The socket task has published its final state; everything it
                // relayed before that is already queued.
                while let Ok(event) = events.try_recv() {
                    self.handle_event(&event);
                }
                break;
            }

            tokio::select! {
                line = input.next_line(), if input_open => match line {
                    Ok(Some(line)) => {
                        let Some(request) = ShellRequest::parse(&line) else { continue };
                        if self.handle_request(request).is_break() {
                            break;
                        }
                    }
                    Ok(None) => {
                        tracing::info!(state = %self.state(), "app: input closed");
                        input_open = false;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "app: input read failed");
                        input_open = false;
                    }
                },
                Some(event) = events.recv() => self.handle_event(&event),
                else => break,
            }
        }
        self.shutdown().await;
    }
}

#[cfg(test)]
#[path = "app_test.rs"]
mod tests;
