//! Execution Feed Binary
//!
//! Starts the Bybit private execution stream client and logs every
//! delivered execution to the console.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin execution-feed
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `BYBIT_API_KEY`: Bybit API key
//! - `BYBIT_API_SECRET`: Bybit API secret
//!
//! ## Optional
//! - `BYBIT_WS_URL`: Private stream endpoint (default: wss://stream.bybit.com/v5/private)
//! - `BYBIT_REST_URL`: REST base URL (default: <https://api.bybit.com>)
//! - `FEED_SYMBOLS`: Comma-separated recovery symbols (default: BTCUSDT,ETHUSDT)
//! - `FEED_RECV_WINDOW_MS`: Signed-request receive window (default: 25000)
//! - `FEED_BACKOFF_STEP_SECS`: Backoff step per attempt (default: 2)
//! - `FEED_BACKOFF_MAX_SECS`: Backoff cap (default: 30)
//! - `RUST_LOG`: Log level (default: info)

use std::time::Duration;

use async_trait::async_trait;
use execution_feed::infrastructure::telemetry;
use execution_feed::{ConnectionSupervisor, ExecutionEvent, ExecutionSink, FeedConfig};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    load_dotenv();
    telemetry::init();

    tracing::info!("Starting execution feed");

    let config = FeedConfig::from_env()?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let supervisor = ConnectionSupervisor::new(&config, ConsoleSink, shutdown_token.clone());
    let feed_handle = tokio::spawn(supervisor.run());

    await_shutdown(shutdown_token).await;

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, feed_handle).await {
        Ok(Ok(watermark)) => {
            tracing::info!(watermark, "execution feed stopped");
        }
        Ok(Err(e)) => {
            tracing::error!(error = %e, "execution feed task failed");
        }
        Err(_) => {
            tracing::warn!(
                timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
                "execution feed did not stop within the shutdown timeout"
            );
        }
    }

    Ok(())
}

/// Console sink: logs each delivered execution.
struct ConsoleSink;

#[async_trait]
impl ExecutionSink for ConsoleSink {
    async fn deliver(&mut self, event: &ExecutionEvent) -> anyhow::Result<()> {
        tracing::info!(
            exec_id = %event.exec_id,
            symbol = %event.symbol,
            side = %event.side,
            price = %event.price,
            qty = %event.qty,
            exec_time = ?event.exec_time(),
            "execution"
        );
        Ok(())
    }
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Log the parsed configuration (credentials redacted by their Debug impl).
fn log_config(config: &FeedConfig) {
    tracing::info!(
        ws_url = %config.connection.ws_url,
        rest_url = %config.connection.rest_url,
        symbols = ?config.recovery.symbols,
        recv_window_ms = config.recovery.recv_window_ms,
        backoff_step_secs = config.backoff.step.as_secs(),
        backoff_max_secs = config.backoff.max_delay.as_secs(),
        "Configuration loaded"
    );
}

/// Wait for shutdown signal (SIGTERM or SIGINT).
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}
