use chrono::{DateTime, Utc};

use crate::model::calibration::CalibratedModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalDirection {
    /// Residual within the threshold band, including the boundary itself.
    NoSignal,
    /// Y trades below the model: long Y, short X.
    BuyPair,
    /// Y trades above the model: short Y, long X.
    SellPair,
}

impl std::fmt::Display for SignalDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalDirection::NoSignal => write!(f, "NO_SIGNAL"),
            SignalDirection::BuyPair => write!(f, "BUY_PAIR"),
            SignalDirection::SellPair => write!(f, "SELL_PAIR"),
        }
    }
}

/// Advisory classification produced each tick. Ephemeral, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct SignalEvent {
    pub timestamp: DateTime<Utc>,
    pub direction: SignalDirection,
    pub live_error: f64,
    pub threshold: f64,
}

/// Classify live prices against the calibrated model.
///
/// Pure and stateless: identical inputs always produce the same direction.
/// Both inequalities are strict, so an error landing exactly on the
/// threshold stays NO_SIGNAL.
pub fn detect(live_x: f64, live_y: f64, model: &CalibratedModel) -> SignalEvent {
    let live_error = live_y - model.predict_y(live_x);
    let direction = if live_error > model.threshold {
        SignalDirection::SellPair
    } else if live_error < -model.threshold {
        SignalDirection::BuyPair
    } else {
        SignalDirection::NoSignal
    };
    SignalEvent {
        timestamp: Utc::now(),
        direction,
        live_error,
        threshold: model.threshold,
    }
}
