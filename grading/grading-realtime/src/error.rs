//! Error types for grading-realtime crate.

use grading_dataset::DatasetError;
use grading_training::GradingError;
use thiserror::Error;

/// Errors that can occur while starting or running the real-time predictor.
#[derive(Debug, Error)]
pub enum RealtimeError {
    /// The model store holds no bundle.
    #[error("no model loaded; train or load a model before watching")]
    ModelNotLoaded,

    /// The predictor was stopped and cannot run again.
    #[error("real-time predictor is stopped")]
    Stopped,

    /// The sample source could not be scanned.
    #[error("sample source error: {0}")]
    Source(#[from] DatasetError),

    /// Predictor setup failed.
    #[error(transparent)]
    Grading(#[from] GradingError),
}

/// Result type for real-time operations.
pub type Result<T> = std::result::Result<T, RealtimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        assert!(RealtimeError::ModelNotLoaded.to_string().contains("no model"));
        let err: RealtimeError = DatasetError::directory_not_found("/watch").into();
        assert!(err.to_string().contains("/watch"));
    }
}
