/// Open/high/low/close summary for one side of a candle period.
/// The venue omits individual fields when no trades printed in the bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Ohlc {
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
}

/// One aggregated price period for a single market. Immutable once fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct Candle {
    /// End-of-period timestamp, unix seconds UTC.
    pub timestamp: i64,
    pub yes_bid: Ohlc,
    pub yes_ask: Ohlc,
    pub price: Ohlc,
    pub price_mean: Option<f64>,
    pub volume: u64,
    pub open_interest: u64,
}

impl Candle {
    /// The closing yes-bid price, the series the calibration pipeline keys on.
    pub fn close_price(&self) -> Option<f64> {
        self.yes_bid.close
    }
}
