//! Olive chat server and console client.
//!
//! `olive-chat serve` (the default) runs the `/chat/` endpoint;
//! `olive-chat console` chats with a running server from the terminal.

use clap::Parser;
use dotenvy::dotenv;
use mimalloc::MiMalloc;
use std::sync::Arc;

use olive_chat::config::{AppConfig, Cli, Command};
use olive_chat::{console, server, telemetry};

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env (if present) before clap reads env-backed flags
    let _ = dotenv();

    let cli = Cli::parse();
    telemetry::init_tracing(cli.log_json);

    let config = Arc::new(AppConfig::load_from_cli(&cli)?);

    match cli.command.as_ref().unwrap_or(&Command::Serve) {
        Command::Serve => server::start_server(config).await,
        Command::Console { .. } => console::run_console(&config).await,
    }
}
