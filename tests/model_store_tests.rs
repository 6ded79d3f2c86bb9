use std::path::PathBuf;

use pair_sentinel::error::AppError;
use pair_sentinel::model_store;

fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "pair-sentinel-it-{name}-{}.json",
        std::process::id()
    ))
}

#[test]
/// Verifies the persisted record shape from an external producer: the wire
/// key is trade_threshold and r_squared is optional.
fn loads_externally_written_record() {
    let path = scratch_path("external");
    std::fs::write(
        &path,
        r#"{
            "ticker_x": "KXSPACEXCOUNT-25-140",
            "ticker_y": "KXHURCTOTMAJ-25DEC01-T5",
            "slope": 0.8421,
            "intercept": 3.1,
            "trade_threshold": 0.07
        }"#,
    )
    .unwrap();

    let model = model_store::load(&path).unwrap();
    assert_eq!(model.ticker_x, "KXSPACEXCOUNT-25-140");
    assert!((model.threshold - 0.07).abs() < f64::EPSILON);
    assert_eq!(model.r_squared, None);

    std::fs::remove_file(&path).ok();
}

#[test]
/// An unparsable record is InvalidModel, never a silently defaulted model.
fn corrupt_record_is_invalid_not_defaulted() {
    let path = scratch_path("corrupt");
    std::fs::write(&path, "{not json").unwrap();

    let err = model_store::load(&path).unwrap_err();
    assert!(matches!(err, AppError::InvalidModel(_)));

    std::fs::remove_file(&path).ok();
}

#[test]
fn refuses_to_save_a_non_finite_model() {
    let path = scratch_path("nonfinite");
    let mut model = pair_sentinel::model::calibration::CalibratedModel {
        ticker_x: "X".to_string(),
        ticker_y: "Y".to_string(),
        slope: 1.0,
        intercept: 0.0,
        threshold: 0.1,
        r_squared: None,
    };
    model.intercept = f64::INFINITY;

    let err = model_store::save(&path, &model).unwrap_err();
    assert!(matches!(err, AppError::InvalidModel(_)));
    assert!(!path.exists());
}
