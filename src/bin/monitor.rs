//! Tickerwatch Monitor
//!
//! Polls the watchlist, evaluates signals, sends alerts and listens for
//! /start, /stop and /status commands. Also serves health, metrics and the
//! latest snapshot over HTTP.

use dotenvy::dotenv;
use std::sync::Arc;
use tickerwatch::config::Config;
use tickerwatch::core::http::{start_server, AppState};
use tickerwatch::core::{MonitorLoop, SnapshotBoard};
use tickerwatch::logging;
use tickerwatch::metrics::Metrics;
use tickerwatch::services::{MarketDataProvider, MessagingTransport, TelegramTransport, YahooChartProvider};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    let config = Config::from_env()?;
    logging::init_logging(&config.environment);

    info!("Starting Tickerwatch Monitor");
    info!(environment = %config.environment, "Environment");
    info!(
        symbols = ?config.watchlist,
        refresh_secs = config.refresh_interval.as_secs(),
        policy = %config.policy,
        "Watchlist: {}",
        config.watchlist.join(", ")
    );

    let metrics = Arc::new(Metrics::new()?);
    let board = SnapshotBoard::new();

    let provider: Arc<dyn MarketDataProvider> =
        Arc::new(YahooChartProvider::new(config.market_data_url.clone()));

    let transport: Option<Arc<dyn MessagingTransport>> = if config.messaging_enabled() {
        info!("Telegram transport enabled");
        Some(Arc::new(TelegramTransport::new(
            config.telegram.api_url.clone(),
            config.telegram.bot_token.clone(),
        )))
    } else {
        warn!("TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID not set: alerts are logged only and remote commands are disabled");
        None
    };

    let (intent_tx, intent_rx) = mpsc::channel(32);

    let state = AppState::new(metrics.clone(), board.clone(), intent_tx);
    let port = config.port;
    tokio::spawn(async move {
        if let Err(e) = start_server(port, state).await {
            error!(error = %e, "HTTP server error");
        }
    });

    let mut monitor = MonitorLoop::new(&config, provider, transport, board, metrics)
        .with_intents(intent_rx);

    monitor
        .run(async {
            if let Err(e) = signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            info!("Shutting down monitor...");
        })
        .await;

    info!("Monitor stopped");
    Ok(())
}
