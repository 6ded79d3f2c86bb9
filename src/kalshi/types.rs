use serde::Deserialize;

use crate::error::AppError;
use crate::model::candle::{Candle, Ohlc};
use crate::model::orderbook::{OrderBookSnapshot, PriceLevel};

/// GET /markets/{ticker}
#[derive(Debug, Deserialize)]
pub struct MarketResponse {
    pub market: Option<MarketRecord>,
}

#[derive(Debug, Deserialize)]
pub struct MarketRecord {
    pub event_ticker: Option<String>,
}

/// GET /events/{ticker}
#[derive(Debug, Deserialize)]
pub struct EventResponse {
    pub event: Option<EventRecord>,
}

#[derive(Debug, Deserialize)]
pub struct EventRecord {
    pub series_ticker: Option<String>,
}

/// GET /series/{series}/markets/{market}/candlesticks
#[derive(Debug, Deserialize)]
pub struct CandlestickResponse {
    #[serde(default)]
    pub candlesticks: Vec<RawCandle>,
}

/// The venue nests each OHLC group and omits fields for quiet periods.
#[derive(Debug, Default, Deserialize)]
pub struct RawOhlc {
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub mean: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RawCandle {
    pub end_period_ts: i64,
    #[serde(default)]
    pub price: RawOhlc,
    #[serde(default)]
    pub yes_bid: RawOhlc,
    #[serde(default)]
    pub yes_ask: RawOhlc,
    #[serde(default)]
    pub volume: u64,
    #[serde(default)]
    pub open_interest: u64,
}

impl RawOhlc {
    fn into_ohlc(self) -> Ohlc {
        Ohlc {
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
        }
    }
}

impl RawCandle {
    pub fn into_candle(self) -> Candle {
        let price_mean = self.price.mean;
        Candle {
            timestamp: self.end_period_ts,
            yes_bid: self.yes_bid.into_ohlc(),
            yes_ask: self.yes_ask.into_ohlc(),
            price: self.price.into_ohlc(),
            price_mean,
            volume: self.volume,
            open_interest: self.open_interest,
        }
    }
}

/// GET /markets/{ticker}/orderbook — levels arrive as [price_cents, qty].
#[derive(Debug, Deserialize)]
pub struct OrderBookResponse {
    pub yes: Option<RawOrderBookSide>,
}

#[derive(Debug, Deserialize)]
pub struct RawOrderBookSide {
    pub bids: Option<Vec<[i64; 2]>>,
    pub asks: Option<Vec<[i64; 2]>>,
}

impl OrderBookResponse {
    /// Normalise the wire shape into the canonical snapshot. Everything
    /// downstream works with [`OrderBookSnapshot`]; nothing else branches
    /// on the payload shape.
    pub fn into_snapshot(self, ticker: &str) -> Result<OrderBookSnapshot, AppError> {
        let yes = self.yes.ok_or_else(|| {
            AppError::DataFormat(format!("order book for {ticker} missing 'yes' side"))
        })?;
        let bids = yes.bids.ok_or_else(|| {
            AppError::DataFormat(format!("order book for {ticker} missing 'bids'"))
        })?;
        let asks = yes.asks.ok_or_else(|| {
            AppError::DataFormat(format!("order book for {ticker} missing 'asks'"))
        })?;
        Ok(OrderBookSnapshot {
            bids: bids
                .into_iter()
                .map(|[price_cents, qty]| PriceLevel { price_cents, qty })
                .collect(),
            asks: asks
                .into_iter()
                .map(|[price_cents, qty]| PriceLevel { price_cents, qty })
                .collect(),
        })
    }
}
