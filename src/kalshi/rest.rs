use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::error::AppError;
use crate::model::candle::Candle;
use crate::model::orderbook::OrderBookSnapshot;

use super::types::{CandlestickResponse, EventResponse, MarketResponse, OrderBookResponse};

/// Candle periods the venue supports, in minutes.
pub const VALID_PERIODS: [u32; 3] = [1, 60, 1440];

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Thin, stateless client for the upstream market-data API. Purely a
/// translation/fetch layer: no caching, no retries, no side effects
/// beyond the network call itself.
pub struct KalshiRestClient {
    http: reqwest::Client,
    base_url: String,
}

impl KalshiRestClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .unwrap_or_default(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, AppError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("GET {path} failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AppError::Upstream(format!("GET {path} returned {status}")));
        }

        resp.json::<T>()
            .await
            .map_err(|e| AppError::DataFormat(format!("GET {path} returned unexpected body: {e}")))
    }

    /// Resolve a market ticker to its series ticker by walking
    /// market -> event -> series through the venue's metadata.
    pub async fn resolve_series(&self, market_ticker: &str) -> Result<String, AppError> {
        let market: MarketResponse = self.get_json(&format!("/markets/{market_ticker}"), &[]).await?;
        let event_ticker = market
            .market
            .and_then(|m| m.event_ticker)
            .ok_or_else(|| {
                AppError::DataFormat(format!("market record for {market_ticker} missing event_ticker"))
            })?;

        let event: EventResponse = self.get_json(&format!("/events/{event_ticker}"), &[]).await?;
        event
            .event
            .and_then(|e| e.series_ticker)
            .ok_or_else(|| {
                AppError::DataFormat(format!("event record for {event_ticker} missing series_ticker"))
            })
    }

    /// Fetch candles in [start_ts, end_ts], sorted ascending by period end.
    /// An empty window is a valid result, not an error.
    pub async fn fetch_candles(
        &self,
        series_ticker: &str,
        market_ticker: &str,
        start_ts: i64,
        end_ts: i64,
        period_minutes: u32,
    ) -> Result<Vec<Candle>, AppError> {
        if !VALID_PERIODS.contains(&period_minutes) {
            return Err(AppError::InvalidArgument(format!(
                "period_minutes must be one of {VALID_PERIODS:?}, got {period_minutes}"
            )));
        }

        let path = format!("/series/{series_ticker}/markets/{market_ticker}/candlesticks");
        let query = [
            ("start_ts", start_ts.to_string()),
            ("end_ts", end_ts.to_string()),
            ("period_interval", period_minutes.to_string()),
        ];
        let resp: CandlestickResponse = self.get_json(&path, &query).await?;

        let mut candles: Vec<Candle> = resp
            .candlesticks
            .into_iter()
            .map(|raw| raw.into_candle())
            .collect();
        candles.sort_by_key(|c| c.timestamp);
        Ok(candles)
    }

    /// Fetch the live "yes" order book, normalised to the canonical snapshot.
    pub async fn fetch_order_book(&self, ticker: &str) -> Result<OrderBookSnapshot, AppError> {
        let resp: OrderBookResponse = self
            .get_json(&format!("/markets/{ticker}/orderbook"), &[])
            .await?;
        resp.into_snapshot(ticker)
    }
}
