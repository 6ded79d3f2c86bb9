use chrono::DateTime;
use serde::Serialize;

use crate::align::{self, AlignedPoint};
use crate::error::AppError;
use crate::kalshi::rest::KalshiRestClient;
use crate::model::calibration::CalibratedModel;
use crate::timespec::parse_time_spec;

/// Parameters for one calibration run.
///
/// `mixing_factor` applies `y' = y + mixing_factor * x` before fitting. It
/// exists to synthetically inflate correlation for demos and tests; the
/// default of 0.0 is the identity and is what production calibration uses.
#[derive(Debug, Clone)]
pub struct CalibrationRequest {
    pub ticker_x: String,
    pub ticker_y: String,
    /// Time spec: absolute date/time or a relative "-Nd" form.
    pub start: String,
    /// Time spec: absolute date/time or "now".
    pub end: String,
    pub mixing_factor: f64,
    pub period_minutes: u32,
}

impl CalibrationRequest {
    pub fn new(ticker_x: &str, ticker_y: &str, start: &str, end: &str) -> Self {
        Self {
            ticker_x: ticker_x.to_string(),
            ticker_y: ticker_y.to_string(),
            start: start.to_string(),
            end: end.to_string(),
            mixing_factor: 0.0,
            period_minutes: 60,
        }
    }
}

/// A fitted pair relationship plus the aligned points it was fitted on,
/// with residuals computed across the full timeline.
#[derive(Debug, Clone)]
pub struct Calibration {
    pub points: Vec<AlignedPoint>,
    pub slope: f64,
    pub intercept: f64,
    pub correlation: f64,
    pub overlapping_points: usize,
    pub trade_opportunities: usize,
    pub mixing_factor: f64,
}

/// Wire contract of the calibration service endpoint. Routing and HTTP
/// status mapping belong to the hosting layer; the shape is fixed here.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalibrationReport {
    pub time_series: Vec<TimeSeriesEntry>,
    pub residuals: Vec<ResidualEntry>,
    pub correlation: f64,
    pub total_points: usize,
    pub overlapping_points: usize,
    pub trade_opportunities: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimeSeriesEntry {
    pub time: String,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResidualEntry {
    pub time: String,
    pub residual: Option<f64>,
}

/// Fit `y = slope * x + intercept` over the overlap points of an aligned
/// series and compute residuals for every point with both prices present
/// (forward-filled ones included, so implied mispricing is visible across
/// the whole timeline, not only overlap periods).
pub fn calibrate(
    mut points: Vec<AlignedPoint>,
    mixing_factor: f64,
) -> Result<Calibration, AppError> {
    let pairs = overlap_pairs(&points, mixing_factor);
    let overlapping_points = points.iter().filter(|p| p.is_overlap).count();

    if pairs.len() < 2 {
        return Err(AppError::InsufficientData(format!(
            "need at least 2 overlapping points with prices, got {}",
            pairs.len()
        )));
    }

    let (slope, intercept) = fit_ols(&pairs)?;
    let correlation = pearson(&pairs);

    for point in &mut points {
        if let (Some(x), Some(y)) = (point.x_price, point.y_price) {
            let mixed_y = y + mixing_factor * x;
            point.residual = Some(mixed_y - (slope * x + intercept));
        }
    }

    // Coarse proxy: exact equality to zero is float-fragile, so on real data
    // nearly every overlap point counts. Kept as-is rather than patched with
    // an epsilon the product never defined.
    let trade_opportunities = points
        .iter()
        .filter(|p| p.is_overlap && p.residual.is_some_and(|r| r != 0.0))
        .count();

    Ok(Calibration {
        points,
        slope,
        intercept,
        correlation,
        overlapping_points,
        trade_opportunities,
        mixing_factor,
    })
}

impl Calibration {
    /// Standard deviation of the residuals at overlap points. Basis for the
    /// trade threshold persisted with the model.
    pub fn residual_std(&self) -> f64 {
        let residuals: Vec<f64> = self
            .points
            .iter()
            .filter(|p| p.is_overlap)
            .filter_map(|p| p.residual)
            .collect();
        if residuals.is_empty() {
            return 0.0;
        }
        let mean = residuals.iter().sum::<f64>() / residuals.len() as f64;
        let var =
            residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / residuals.len() as f64;
        var.sqrt()
    }

    pub fn to_model(&self, ticker_x: &str, ticker_y: &str) -> CalibratedModel {
        CalibratedModel {
            ticker_x: ticker_x.to_string(),
            ticker_y: ticker_y.to_string(),
            slope: self.slope,
            intercept: self.intercept,
            // Two sigmas of in-sample residual spread: wide enough to ignore
            // noise, tight enough to fire on genuine dislocations.
            threshold: 2.0 * self.residual_std(),
            r_squared: Some(self.correlation * self.correlation),
        }
    }

    /// Overlap-only view for charting, matching the service contract.
    pub fn into_report(self) -> CalibrationReport {
        let total_points = self.points.len();
        let mut time_series = Vec::new();
        let mut residuals = Vec::new();

        for point in self.points.iter().filter(|p| p.is_overlap) {
            let time = format_ts(point.timestamp);
            let mixed_y = match (point.x_price, point.y_price) {
                (Some(x), Some(y)) => Some(y + self.mixing_factor * x),
                (_, y) => y,
            };
            time_series.push(TimeSeriesEntry {
                time: time.clone(),
                x: point.x_price,
                y: mixed_y,
            });
            residuals.push(ResidualEntry {
                time,
                residual: point.residual,
            });
        }

        CalibrationReport {
            time_series,
            residuals,
            correlation: self.correlation,
            total_points,
            overlapping_points: self.overlapping_points,
            trade_opportunities: self.trade_opportunities,
        }
    }
}

/// Full calibration pipeline against the live venue: resolve both series,
/// fetch candles for the requested window, align, and fit. All-or-nothing;
/// any failure propagates to the caller.
pub async fn run_calibration(
    client: &KalshiRestClient,
    request: &CalibrationRequest,
) -> Result<Calibration, AppError> {
    let start_ts = parse_time_spec(&request.start)?;
    let end_ts = parse_time_spec(&request.end)?;

    let series_x = client.resolve_series(&request.ticker_x).await?;
    let series_y = client.resolve_series(&request.ticker_y).await?;

    let candles_x = client
        .fetch_candles(
            &series_x,
            &request.ticker_x,
            start_ts,
            end_ts,
            request.period_minutes,
        )
        .await?;
    let candles_y = client
        .fetch_candles(
            &series_y,
            &request.ticker_y,
            start_ts,
            end_ts,
            request.period_minutes,
        )
        .await?;

    tracing::info!(
        ticker_x = %request.ticker_x,
        ticker_y = %request.ticker_y,
        candles_x = candles_x.len(),
        candles_y = candles_y.len(),
        "Fetched candle history"
    );

    let points = align::align(&candles_x, &candles_y);
    calibrate(points, request.mixing_factor)
}

fn overlap_pairs(points: &[AlignedPoint], mixing_factor: f64) -> Vec<(f64, f64)> {
    points
        .iter()
        .filter(|p| p.is_overlap)
        .filter_map(|p| match (p.x_price, p.y_price) {
            (Some(x), Some(y)) => Some((x, y + mixing_factor * x)),
            _ => None,
        })
        .collect()
}

fn fit_ols(pairs: &[(f64, f64)]) -> Result<(f64, f64), AppError> {
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let var_x = pairs.iter().map(|(x, _)| (x - mean_x).powi(2)).sum::<f64>();
    if var_x == 0.0 {
        return Err(AppError::DegenerateModel(
            "x has zero variance across overlap points, slope undefined".to_string(),
        ));
    }
    let cov_xy = pairs
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum::<f64>();

    let slope = cov_xy / var_x;
    let intercept = mean_y - slope * mean_x;
    Ok((slope, intercept))
}

/// Pearson coefficient over (x, y) pairs. Undefined cases (fewer than two
/// points, zero variance) report 0.0 instead of leaking NaN to callers;
/// the point counts on the report tell them how thin the data was.
fn pearson(pairs: &[(f64, f64)]) -> f64 {
    if pairs.len() < 2 {
        return 0.0;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let var_x = pairs.iter().map(|(x, _)| (x - mean_x).powi(2)).sum::<f64>();
    let var_y = pairs.iter().map(|(_, y)| (y - mean_y).powi(2)).sum::<f64>();
    if var_x == 0.0 || var_y == 0.0 {
        return 0.0;
    }
    let cov_xy = pairs
        .iter()
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum::<f64>();
    cov_xy / (var_x.sqrt() * var_y.sqrt())
}

fn format_ts(ts: i64) -> String {
    DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| ts.to_string())
}
