use pair_sentinel::align::align;
use pair_sentinel::model::candle::{Candle, Ohlc};

fn candle(timestamp: i64, close: f64) -> Candle {
    Candle {
        timestamp,
        yes_bid: Ohlc {
            open: Some(close),
            high: Some(close),
            low: Some(close),
            close: Some(close),
        },
        yes_ask: Ohlc::default(),
        price: Ohlc::default(),
        price_mean: None,
        volume: 1,
        open_interest: 1,
    }
}

#[test]
/// Verifies the axis invariant: for any pair of unsorted, overlapping,
/// duplicate-carrying inputs the output timestamps are strictly increasing
/// and unique.
fn aligned_axis_is_strictly_increasing_and_unique() {
    let xs = vec![
        candle(300, 1.0),
        candle(100, 2.0),
        candle(200, 3.0),
        candle(200, 3.5),
    ];
    let ys = vec![candle(150, 4.0), candle(300, 5.0), candle(100, 6.0)];

    let aligned = align(&xs, &ys);
    for pair in aligned.windows(2) {
        assert!(
            pair[0].timestamp < pair[1].timestamp,
            "axis not strictly increasing: {} then {}",
            pair[0].timestamp,
            pair[1].timestamp
        );
    }
    assert_eq!(aligned.len(), 4); // {100, 150, 200, 300}
}

#[test]
/// Verifies causal forward fill: the value at T comes from the latest raw
/// close at or before T, never from a later observation.
fn fill_at_t_never_uses_future_observations() {
    let xs = vec![candle(100, 10.0), candle(400, 40.0)];
    let ys = vec![candle(200, 1.0), candle(300, 2.0)];

    let aligned = align(&xs, &ys);
    let at = |ts: i64| aligned.iter().find(|p| p.timestamp == ts).unwrap();

    assert_eq!(at(200).x_price, Some(10.0));
    assert_eq!(at(300).x_price, Some(10.0));
    assert_eq!(at(400).x_price, Some(40.0));
    // Y before its first observation stays empty.
    assert_eq!(at(100).y_price, None);
}

#[test]
/// Verifies overlap semantics: is_overlap at T iff both markets reported a
/// raw candle at exactly T, regardless of what forward fill produced.
fn overlap_requires_raw_candles_on_both_sides() {
    let xs = vec![candle(100, 10.0), candle(300, 30.0)];
    let ys = vec![candle(100, 1.0), candle(200, 2.0), candle(300, 3.0)];

    let aligned = align(&xs, &ys);
    let overlaps: Vec<(i64, bool)> = aligned.iter().map(|p| (p.timestamp, p.is_overlap)).collect();
    assert_eq!(overlaps, vec![(100, true), (200, false), (300, true)]);

    // The non-overlap point still carries a filled x value for display.
    let gap = aligned.iter().find(|p| p.timestamp == 200).unwrap();
    assert_eq!(gap.x_price, Some(10.0));
    assert!(gap.has_y && !gap.has_x);
}

#[test]
/// Disjoint windows never produce an overlap point.
fn disjoint_series_have_no_overlap() {
    let xs = vec![candle(100, 10.0), candle(200, 20.0)];
    let ys = vec![candle(300, 1.0), candle(400, 2.0)];

    let aligned = align(&xs, &ys);
    assert_eq!(aligned.len(), 4);
    assert!(aligned.iter().all(|p| !p.is_overlap));
}
