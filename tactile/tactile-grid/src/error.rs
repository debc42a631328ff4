//! Error types for tactile-grid crate.

use thiserror::Error;

/// Errors that can occur while building or evaluating a hardness grid.
#[derive(Debug, Error)]
pub enum GridError {
    /// The contact geometry spans no area, so no lattice can be laid over it.
    #[error("degenerate geometry: extent {width} x {height}")]
    DegenerateGeometry {
        /// Extent along x.
        width: f64,
        /// Extent along y.
        height: f64,
    },

    /// Channel value count does not match the geometry.
    #[error("channel count mismatch: expected {expected}, got {actual}")]
    ChannelCountMismatch {
        /// Expected value count.
        expected: usize,
        /// Actual value count.
        actual: usize,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Grade outside `1..=k`.
    #[error("grade {grade} outside 1..={num_grades}")]
    GradeOutOfRange {
        /// The requested grade.
        grade: usize,
        /// Number of grades.
        num_grades: usize,
    },
}

impl GridError {
    /// Creates a degenerate geometry error.
    #[must_use]
    pub const fn degenerate_geometry(width: f64, height: f64) -> Self {
        Self::DegenerateGeometry { width, height }
    }

    /// Creates a channel count mismatch error.
    #[must_use]
    pub const fn channel_mismatch(expected: usize, actual: usize) -> Self {
        Self::ChannelCountMismatch { expected, actual }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, GridError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_degenerate_geometry() {
        let err = GridError::degenerate_geometry(12.0, 0.0);
        assert!(err.to_string().contains("degenerate geometry"));
        assert!(err.to_string().contains("12"));
    }

    #[test]
    fn error_channel_mismatch() {
        let err = GridError::channel_mismatch(239, 99);
        assert!(err.to_string().contains("239"));
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn error_invalid_config() {
        let err = GridError::invalid_config("radius must be positive");
        assert!(err.to_string().contains("invalid configuration"));
    }

    #[test]
    fn error_grade_out_of_range() {
        let err = GridError::GradeOutOfRange {
            grade: 5,
            num_grades: 4,
        };
        assert!(err.to_string().contains("1..=4"));
    }
}
