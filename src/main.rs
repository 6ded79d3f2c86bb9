use std::path::Path;

use anyhow::{Context, Result};
use tokio::sync::watch;
use tracing::{error, info};

use pair_sentinel::config::Config;
use pair_sentinel::kalshi::rest::KalshiRestClient;
use pair_sentinel::model_store;
use pair_sentinel::monitor::MonitorLoop;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    // Missing or malformed model is fatal: the loop must not start.
    let model = match model_store::load(Path::new(&config.monitor.model_path)) {
        Ok(model) => model,
        Err(err) => {
            error!(error = %err, "Cannot start live monitor");
            return Err(err.into());
        }
    };

    info!(
        ticker_x = %model.ticker_x,
        ticker_y = %model.ticker_y,
        r_squared = ?model.r_squared,
        "Calibrated model loaded"
    );

    let client = KalshiRestClient::new(&config.kalshi.api_base);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, requesting shutdown");
            let _ = shutdown_tx.send(true);
        }
    });

    let monitor = MonitorLoop::new(
        client,
        model,
        config.monitor.monitor_config(),
        shutdown_rx,
    );
    monitor.run().await?;
    Ok(())
}
