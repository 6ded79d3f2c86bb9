use std::path::Path;

use crate::error::AppError;
use crate::model::calibration::CalibratedModel;

/// Load a persisted calibration and validate it before any use.
///
/// Missing file is fatal for the live loop (the caller must run calibration
/// first); a present-but-malformed model is equally fatal. No field is ever
/// substituted with a default.
pub fn load(path: &Path) -> Result<CalibratedModel, AppError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(AppError::ModelNotFound(format!(
                "{} — run the calibrate binary first",
                path.display()
            )));
        }
        Err(err) => return Err(err.into()),
    };

    let model: CalibratedModel = serde_json::from_str(&raw)
        .map_err(|e| AppError::InvalidModel(format!("{}: {e}", path.display())))?;
    model.validate()?;
    Ok(model)
}

/// Persist a calibration as pretty JSON (the shape [`load`] reads back).
pub fn save(path: &Path, model: &CalibratedModel) -> Result<(), AppError> {
    model.validate()?;
    let json = serde_json::to_string_pretty(model)
        .map_err(|e| AppError::InvalidModel(e.to_string()))?;
    std::fs::write(path, json)?;
    Ok(())
}
