//! Error types for grading-dataset crate.

use tactile_types::TactileError;
use thiserror::Error;

/// Errors that can occur while discovering or loading samples.
#[derive(Debug, Error)]
pub enum DatasetError {
    /// A sample file does not follow the frame schema.
    #[error("malformed sample {sample}: {reason}")]
    MalformedSample {
        /// Sample identifier.
        sample: String,
        /// Reason for rejection.
        reason: String,
    },

    /// Sample not found.
    #[error("sample not found: {0}")]
    SampleNotFound(String),

    /// Data directory does not exist or is not a directory.
    #[error("data directory not found: {0}")]
    DirectoryNotFound(String),

    /// No sample files in the directory.
    #[error("no samples in {0}")]
    EmptyDataset(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),
}

impl DatasetError {
    /// Creates a malformed sample error.
    #[must_use]
    pub fn malformed(sample: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSample {
            sample: sample.into(),
            reason: reason.into(),
        }
    }

    /// Creates a sample not found error.
    #[must_use]
    pub fn sample_not_found(path: impl Into<String>) -> Self {
        Self::SampleNotFound(path.into())
    }

    /// Creates a directory not found error.
    #[must_use]
    pub fn directory_not_found(path: impl Into<String>) -> Self {
        Self::DirectoryNotFound(path.into())
    }

    /// Creates an empty dataset error.
    #[must_use]
    pub fn empty_dataset(path: impl Into<String>) -> Self {
        Self::EmptyDataset(path.into())
    }
}

impl From<std::io::Error> for DatasetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<TactileError> for DatasetError {
    fn from(err: TactileError) -> Self {
        match err {
            TactileError::MalformedSample { sample, reason } => Self::MalformedSample { sample, reason },
            TactileError::EmptySample(sample) => Self::malformed(sample, "no data rows"),
            TactileError::Io(reason) => Self::Io(reason),
            other => Self::malformed("<unknown>", other.to_string()),
        }
    }
}

/// Result type for dataset operations.
pub type Result<T> = std::result::Result<T, DatasetError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_malformed() {
        let err = DatasetError::malformed("press_3", "row 0 has 12 columns");
        assert!(err.to_string().contains("malformed sample press_3"));
    }

    #[test]
    fn error_directory_not_found() {
        let err = DatasetError::directory_not_found("/data/missing");
        assert!(err.to_string().contains("/data/missing"));
    }

    #[test]
    fn error_from_tactile() {
        let err: DatasetError = TactileError::malformed("s", "short row").into();
        assert!(matches!(err, DatasetError::MalformedSample { ref sample, .. } if sample == "s"));

        let err: DatasetError = TactileError::EmptySample("e".into()).into();
        assert!(err.to_string().contains("no data rows"));
    }

    #[test]
    fn error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: DatasetError = io_err.into();
        assert!(matches!(err, DatasetError::Io(_)));
    }
}
