use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("upstream API error: {0}")]
    Upstream(String),

    #[error("unexpected payload shape: {0}")]
    DataFormat(String),

    #[error("invalid time spec '{spec}': {reason}")]
    InvalidTimeSpec { spec: String, reason: String },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("insufficient data for calibration: {0}")]
    InsufficientData(String),

    #[error("degenerate model: {0}")]
    DegenerateModel(String),

    #[error("calibrated model not found: {0}")]
    ModelNotFound(String),

    #[error("invalid calibrated model: {0}")]
    InvalidModel(String),

    #[error("live quotes unavailable: {0}")]
    QuotesUnavailable(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// How the live monitor loop reacts to a failed tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// One leg has no quotes right now. Sleep briefly and try again,
    /// without touching the error counter.
    SkipTick,
    /// Network or payload trouble reaching the venue. Counts toward
    /// the consecutive-error backoff.
    Transient,
    /// The loop must not run (missing or malformed model). No retry.
    Fatal,
}

impl AppError {
    pub fn failure_class(&self) -> FailureClass {
        match self {
            AppError::QuotesUnavailable(_) => FailureClass::SkipTick,
            AppError::ModelNotFound(_) | AppError::InvalidModel(_) => FailureClass::Fatal,
            _ => FailureClass::Transient,
        }
    }

    /// True for errors caused by caller input rather than the upstream venue.
    /// A service boundary can map these to a 4xx instead of a blanket 500.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            AppError::InvalidTimeSpec { .. } | AppError::InvalidArgument(_)
        )
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Upstream(err.to_string())
    }
}
