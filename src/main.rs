mod app;
mod config;
mod shell;
mod terminal;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use crate::app::App;
use crate::config::{Cli, ConfigError, ShellConfig};
use crate::terminal::TerminalShell;

/// `RUST_LOG`-style directives when given and valid, `info` otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() -> Result<(), ConfigError> {
    // Load `.env` before parsing so env-backed flags see its values.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let config = ShellConfig::from_cli(Cli::parse())?;
    tracing::info!(endpoint = %config.endpoint, "teleo: starting");

    let (mut app, mut events) = App::new(config, TerminalShell::new(std::io::stdout()));
    if app.config().connect_on_launch {
        app.open_connection();
    }

    let input = BufReader::new(tokio::io::stdin()).lines();
    app.run(input, &mut events).await;

    let window = app.shell().window();
    tracing::info!(
        state = %app.state(),
        width = window.geometry.width,
        height = window.geometry.height,
        minimized = window.minimized,
        "teleo: shutting down"
    );
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
