//! Error types for grading-features crate.

use thiserror::Error;

/// Errors that can occur during feature extraction.
#[derive(Debug, Error)]
pub enum FeatureError {
    /// Too few usable frames remain after dropping non-finite readings.
    #[error("insufficient data in sample {sample}: {usable} usable frames, need {required}")]
    InsufficientData {
        /// Identifier of the sample.
        sample: String,
        /// Usable frame count.
        usable: usize,
        /// Configured minimum.
        required: usize,
    },

    /// A feature overflowed or is undefined for this sample.
    #[error("feature {feature} of sample {sample} is not finite")]
    NonFiniteFeature {
        /// Identifier of the sample.
        sample: String,
        /// Name of the first offending feature.
        feature: String,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Feature name not in the layout.
    #[error("unknown feature: {0}")]
    UnknownFeature(String),
}

impl FeatureError {
    /// Creates an insufficient data error.
    #[must_use]
    pub fn insufficient_data(sample: impl Into<String>, usable: usize, required: usize) -> Self {
        Self::InsufficientData {
            sample: sample.into(),
            usable,
            required,
        }
    }

    /// Creates a non-finite feature error.
    #[must_use]
    pub fn non_finite(sample: impl Into<String>, feature: impl Into<String>) -> Self {
        Self::NonFiniteFeature {
            sample: sample.into(),
            feature: feature.into(),
        }
    }

    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Creates an unknown feature error.
    #[must_use]
    pub fn unknown_feature(name: impl Into<String>) -> Self {
        Self::UnknownFeature(name.into())
    }
}

/// Result type for feature extraction.
pub type Result<T> = std::result::Result<T, FeatureError>;
