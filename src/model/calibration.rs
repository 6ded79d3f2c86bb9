use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Persisted output of an offline calibration run. Loaded read-only by the
/// live monitor for its entire lifetime; there is no hot-reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CalibratedModel {
    pub ticker_x: String,
    pub ticker_y: String,
    pub slope: f64,
    pub intercept: f64,
    #[serde(rename = "trade_threshold")]
    pub threshold: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r_squared: Option<f64>,
}

impl CalibratedModel {
    /// Reject any model whose parameters are not finite real numbers.
    /// An invalid model must never silently drive live signals.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut bad_fields = Vec::new();
        if !self.slope.is_finite() {
            bad_fields.push("slope");
        }
        if !self.intercept.is_finite() {
            bad_fields.push("intercept");
        }
        if !self.threshold.is_finite() {
            bad_fields.push("trade_threshold");
        }
        if bad_fields.is_empty() {
            Ok(())
        } else {
            Err(AppError::InvalidModel(format!(
                "non-finite field(s): {}",
                bad_fields.join(", ")
            )))
        }
    }

    pub fn predict_y(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}
