//! Offline calibration runner.
//!
//! Fetches candle history for the configured pair, fits the linear model,
//! prints the service-contract report as JSON, and writes `model.json`
//! for the live monitor.
//!
//! Usage: `calibrate [TICKER_X TICKER_Y [START [END]]]`
//! (defaults come from `config/default.toml`; MIXING_FACTOR env overrides
//! the demo-only correlation mixing transform).

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use pair_sentinel::calibrate::run_calibration;
use pair_sentinel::config::Config;
use pair_sentinel::kalshi::rest::KalshiRestClient;
use pair_sentinel::model_store;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("failed to load configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    let mut request = config.calibration.request();
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => {}
        [x, y] => {
            request.ticker_x = x.clone();
            request.ticker_y = y.clone();
        }
        [x, y, start] => {
            request.ticker_x = x.clone();
            request.ticker_y = y.clone();
            request.start = start.clone();
        }
        [x, y, start, end] => {
            request.ticker_x = x.clone();
            request.ticker_y = y.clone();
            request.start = start.clone();
            request.end = end.clone();
        }
        _ => anyhow::bail!("usage: calibrate [TICKER_X TICKER_Y [START [END]]]"),
    }
    if let Ok(mixing) = std::env::var("MIXING_FACTOR") {
        request.mixing_factor = mixing
            .parse()
            .context("MIXING_FACTOR must be a number")?;
    }

    info!(
        ticker_x = %request.ticker_x,
        ticker_y = %request.ticker_y,
        start = %request.start,
        end = %request.end,
        mixing_factor = request.mixing_factor,
        "Running calibration"
    );

    let client = KalshiRestClient::new(&config.kalshi.api_base);
    let calibration = run_calibration(&client, &request).await?;

    let model = calibration.to_model(&request.ticker_x, &request.ticker_y);
    info!(
        slope = model.slope,
        intercept = model.intercept,
        threshold = model.threshold,
        correlation = calibration.correlation,
        overlapping_points = calibration.overlapping_points,
        trade_opportunities = calibration.trade_opportunities,
        "Calibration complete"
    );

    let model_path = Path::new(&config.monitor.model_path);
    model_store::save(model_path, &model)
        .with_context(|| format!("failed to write {}", model_path.display()))?;
    info!(path = %model_path.display(), "Model persisted");

    let report = calibration.into_report();
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
