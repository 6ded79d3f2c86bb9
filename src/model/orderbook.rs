/// One resting level: (price in cents, resting quantity).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceLevel {
    pub price_cents: i64,
    pub qty: i64,
}

/// Canonical order book for the "yes" side of a market, normalised at the
/// fetch boundary. Bids are best-first descending, asks best-first ascending.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBookSnapshot {
    pub bids: Vec<PriceLevel>,
    pub asks: Vec<PriceLevel>,
}

impl OrderBookSnapshot {
    pub fn best_bid(&self) -> Option<PriceLevel> {
        self.bids.first().copied()
    }

    pub fn best_ask(&self) -> Option<PriceLevel> {
        self.asks.first().copied()
    }

    /// Mid price in dollars: (best bid + best ask) / 2, converted from cents.
    /// Requires at least one resting order on each side.
    pub fn mid_price(&self) -> Option<f64> {
        let bid = self.best_bid()?;
        let ask = self.best_ask()?;
        Some((bid.price_cents + ask.price_cents) as f64 / 2.0 / 100.0)
    }
}
