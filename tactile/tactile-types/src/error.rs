//! Error types for tactile data handling.

use thiserror::Error;

/// Errors that can occur when building or ingesting tactile data.
#[derive(Debug, Error)]
pub enum TactileError {
    /// A sample could not be parsed into frames (wrong column count, no rows).
    #[error("malformed sample {sample}: {reason}")]
    MalformedSample {
        /// Identifier of the offending sample.
        sample: String,
        /// Reason for rejection.
        reason: String,
    },

    /// Contact channel count does not match the fixed sensor layout.
    #[error("contact channel mismatch: expected {expected}, got {actual}")]
    ChannelCountMismatch {
        /// Expected channel count.
        expected: usize,
        /// Actual channel count.
        actual: usize,
    },

    /// A sample must contain at least one frame.
    #[error("sample {0} has no frames")]
    EmptySample(String),

    /// Geometry table is unusable.
    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),
}

impl TactileError {
    /// Creates a malformed sample error.
    #[must_use]
    pub fn malformed(sample: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedSample {
            sample: sample.into(),
            reason: reason.into(),
        }
    }

    /// Creates a channel count mismatch error.
    #[must_use]
    pub const fn channel_mismatch(expected: usize, actual: usize) -> Self {
        Self::ChannelCountMismatch { expected, actual }
    }

    /// Creates an invalid geometry error.
    #[must_use]
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        Self::InvalidGeometry(reason.into())
    }
}

impl From<std::io::Error> for TactileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for tactile data operations.
pub type Result<T> = std::result::Result<T, TactileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_malformed() {
        let err = TactileError::malformed("press_7", "row 3 has 12 columns");
        let msg = format!("{err}");
        assert!(msg.contains("malformed sample"));
        assert!(msg.contains("press_7"));
        assert!(msg.contains("row 3"));
    }

    #[test]
    fn error_channel_mismatch() {
        let err = TactileError::channel_mismatch(239, 200);
        let msg = format!("{err}");
        assert!(msg.contains("239"));
        assert!(msg.contains("200"));
    }

    #[test]
    fn error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: TactileError = io_err.into();
        assert!(matches!(err, TactileError::Io(_)));
    }
}
