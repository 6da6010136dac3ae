use thiserror::Error;

/// Hard iron calibration error types
#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse data log")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid signal {name}: {reason}")]
    InvalidSignal { name: String, reason: String },

    #[error("Missing channel {source_name}.{channel}")]
    MissingChannel { source_name: String, channel: String },

    #[error("Axis series length mismatch: x={x}, y={y}, z={z}")]
    LengthMismatch { x: usize, y: usize, z: usize },

    #[error("Insufficient samples: got {got}, need at least {required}")]
    InsufficientSamples { got: usize, required: usize },

    #[error("Design matrix is rank deficient (rank {rank} of {required}); samples are coplanar or collinear")]
    RankDeficient { rank: usize, required: usize },

    #[error("Time base from 0 to {end_s}s at {interval_s}s intervals exceeds {max} samples")]
    TimeBaseTooLarge { end_s: f64, interval_s: f64, max: usize },

    #[error("Degenerate sphere fit: {0}")]
    DegenerateFit(String),

    #[error("Render error: {0}")]
    Render(String),
}

impl CalibrationError {
    pub(crate) fn invalid_signal(name: &str, reason: impl Into<String>) -> Self {
        CalibrationError::InvalidSignal {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for calibration operations
pub type Result<T> = std::result::Result<T, CalibrationError>;
