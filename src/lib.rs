//! Statistical-arbitrage tooling for prediction-market pairs.
//!
//! Two halves share one model type: an offline calibration pipeline
//! (candle history -> aligned series -> OLS fit -> persisted model) and a
//! live monitor that polls both legs' order books and emits advisory
//! BUY_PAIR / SELL_PAIR signals when the model residual breaches the
//! calibrated threshold. Signals are advisory only; nothing here places
//! orders.

pub mod align;
pub mod calibrate;
pub mod config;
pub mod error;
pub mod kalshi;
pub mod model;
pub mod model_store;
pub mod monitor;
pub mod timespec;
