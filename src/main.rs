// polychat - terminal client for the multi-assistant chat service
//
// Architecture:
// - API client (reqwest): Per-topic POST wrappers around the chat backend
// - Connectivity watcher: Background probe task publishing reachability
// - Session: Transcript state machine with optimistic sends
// - TUI (ratatui): Catalog browser and chat view
// - Event system: mpsc channel carries settled replies back to the UI

mod api;
mod catalog;
mod cli;
mod config;
mod connectivity;
mod events;
mod logging;
mod session;
mod theme;
mod tui;

use anyhow::Result;
use api::ApiClient;
use clap::Parser;
use config::{Config, LOCAL_BASE_URL};
use logging::{LogBuffer, TuiLogLayer};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = cli::Cli::parse();
    if cli::handle_cli(&cli_args) {
        return Ok(());
    }

    Config::ensure_config_exists();
    let mut config = Config::from_env();
    if cli_args.local {
        config.base_url = LOCAL_BASE_URL.to_string();
    }

    // Logs go to the in-memory buffer only - stdout belongs to the TUI
    let log_buffer = LogBuffer::new();
    let default_filter = format!("polychat={}", config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into());
    tracing_subscriber::registry()
        .with(filter)
        .with(TuiLogLayer::new(log_buffer.clone()))
        .init();

    tracing::info!(base_url = %config.base_url, "starting polychat");

    let client = Arc::new(ApiClient::new(&config)?);
    let (conn_rx, reprobe) = connectivity::spawn_watcher(
        client.clone(),
        Duration::from_secs(config.probe_interval_secs),
    );

    tui::run_tui(&config, client, conn_rx, reprobe, log_buffer).await
}
