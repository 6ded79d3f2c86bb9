use std::collections::BTreeMap;

use crate::model::candle::Candle;

/// One entry on the unified timestamp axis of two candle series.
///
/// `has_x`/`has_y` record *raw* presence (the market reported a candle at
/// exactly this timestamp); `x_price`/`y_price` may be forward-filled from
/// an earlier close. `is_overlap` is derived from raw presence only, never
/// from filled values, so regression runs on unfilled truth points while
/// residual display can still use the filled series.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPoint {
    /// Unix seconds UTC. Strictly increasing and unique across the output.
    pub timestamp: i64,
    pub x_price: Option<f64>,
    pub y_price: Option<f64>,
    pub has_x: bool,
    pub has_y: bool,
    pub is_overlap: bool,
    /// Filled in by the calibrator once a model has been fitted.
    pub residual: Option<f64>,
}

/// Merge two candle series onto the sorted, deduplicated union of their
/// timestamps, forward-filling each close series independently.
///
/// Fill at timestamp T only ever uses an observation at or before T, and
/// nothing is filled before a series' first raw close.
pub fn align(xs: &[Candle], ys: &[Candle]) -> Vec<AlignedPoint> {
    // BTreeMap keyed on timestamp gives the sorted union and drops
    // duplicate periods within a single series (last one wins).
    let x_closes: BTreeMap<i64, Option<f64>> =
        xs.iter().map(|c| (c.timestamp, c.close_price())).collect();
    let y_closes: BTreeMap<i64, Option<f64>> =
        ys.iter().map(|c| (c.timestamp, c.close_price())).collect();

    let mut timestamps: Vec<i64> = x_closes.keys().chain(y_closes.keys()).copied().collect();
    timestamps.sort_unstable();
    timestamps.dedup();

    let mut last_x: Option<f64> = None;
    let mut last_y: Option<f64> = None;
    let mut out = Vec::with_capacity(timestamps.len());

    for ts in timestamps {
        let has_x = x_closes.contains_key(&ts);
        let has_y = y_closes.contains_key(&ts);

        if let Some(Some(close)) = x_closes.get(&ts) {
            last_x = Some(*close);
        }
        if let Some(Some(close)) = y_closes.get(&ts) {
            last_y = Some(*close);
        }

        out.push(AlignedPoint {
            timestamp: ts,
            x_price: last_x,
            y_price: last_y,
            has_x,
            has_y,
            is_overlap: has_x && has_y,
            residual: None,
        });
    }

    out
}
