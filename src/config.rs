//! Shell configuration from command-line flags and environment variables.
//!
//! Every flag has an env fallback so a `.env` file (loaded by `main` before
//! parsing) is enough to run the shell.

use clap::Parser;

pub const DEFAULT_ENDPOINT: &str = "wss://api.playground.scrapybara.com/ws/chat";
pub const DEFAULT_CREDENTIAL_VAR: &str = "SCRAPYBARA_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("endpoint must be a ws:// or wss:// URL, got `{0}`")]
    InvalidEndpoint(String),
    #[error("credential variable name must not be empty")]
    EmptyCredentialVar,
}

#[derive(Parser, Debug)]
#[command(name = "teleo", about = "Floating shell for the playground chat socket")]
pub struct Cli {
    /// WebSocket endpoint of the playground chat API.
    #[arg(long, env = "TELEO_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Name of the environment variable holding the API key.
    #[arg(long, env = "TELEO_CREDENTIAL_VAR", default_value = DEFAULT_CREDENTIAL_VAR)]
    pub credential_var: String,

    /// Open the connection on launch instead of waiting for `/connect`.
    #[arg(long, default_value_t = false)]
    pub connect: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    pub endpoint: String,
    /// The key itself is read from this variable at connect time, never here.
    pub credential_var: String,
    pub connect_on_launch: bool,
}

impl ShellConfig {
    /// Validate parsed flags into a typed config.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] for a non-websocket endpoint
    /// and [`ConfigError::EmptyCredentialVar`] for a blank variable name.
    pub fn from_cli(cli: Cli) -> Result<Self, ConfigError> {
        let endpoint = cli.endpoint.trim().to_owned();
        if !(endpoint.starts_with("ws://") || endpoint.starts_with("wss://")) {
            return Err(ConfigError::InvalidEndpoint(endpoint));
        }

        let credential_var = cli.credential_var.trim().to_owned();
        if credential_var.is_empty() {
            return Err(ConfigError::EmptyCredentialVar);
        }

        Ok(Self { endpoint, credential_var, connect_on_launch: cli.connect })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
