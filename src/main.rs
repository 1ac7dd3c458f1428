//! Gitgram - Gitter-Telegram chat bridge
//!
//! Mirrors messages between one Gitter room and one Telegram chat that an
//! admin binds with `/start`.

mod bridge;
mod common;
mod config;
mod gitter;
mod imgur;
mod telegram;

use std::sync::Arc;

use anyhow::Result;
use tokio::signal;
use tracing::{error, info, warn};

use bridge::{Bridge, BridgeSettings, Rehoster};
use common::error::AppError;
use common::reconnect::ReconnectPolicy;
use config::{env::get_config_path, load_and_validate};
use gitter::GitterClient;
use imgur::ImgurClient;
use telegram::TelegramClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Gitgram v{} starting...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config_path = get_config_path();
    info!("Loading configuration from {}...", config_path);

    let config = load_and_validate(&config_path).map_err(|e| {
        error!("Failed to load configuration: {}", e);
        error!("Please ensure {} exists and is properly formatted.", config_path);
        AppError::from(e)
    })?;

    let admins = config.dest.admin_list();
    info!("Configuration loaded successfully");
    info!("  Gitter room: {}", config.source.room_id);
    info!("  Telegram admins: {}", admins.join(", "));

    let rehoster = match config.dest.image_host_client_id() {
        Some(client_id) => {
            info!("  Image rehosting: enabled");
            Some(Rehoster::new(ImgurClient::new(client_id)))
        }
        None => {
            warn!("  Image rehosting: disabled (no imageHostClientId)");
            None
        }
    };

    let source = Arc::new(GitterClient::new(config.source.token.clone()));
    let dest = Arc::new(TelegramClient::new(config.dest.token.clone())?);

    let settings = BridgeSettings {
        room_id: config.source.room_id.clone(),
        admins,
        initial_binding: config.dest.initial_binding(),
        reconnect: ReconnectPolicy::default(),
    };

    let bridge = Bridge::new(source, dest, settings, rehoster);
    bridge.run(shutdown_signal()).await.map_err(|e| {
        error!("{}", e);
        e
    })?;

    info!("Exiting...");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C"),
        _ = terminate => info!("Received SIGTERM"),
    }
}
