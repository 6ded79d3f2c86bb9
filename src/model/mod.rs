pub mod calibration;
pub mod candle;
pub mod orderbook;
pub mod signal;
