//! Error types for grading-training crate.

use std::fmt;

use grading_dataset::DatasetError;
use grading_features::FeatureError;
use grading_models::ModelError;
use serde::{Deserialize, Serialize};
use tactile_grid::GridError;
use tactile_types::TactileError;
use thiserror::Error;

/// Errors that can occur while training or applying a grading model.
#[derive(Debug, Error)]
pub enum GradingError {
    /// Raw data or geometry error.
    #[error(transparent)]
    Tactile(#[from] TactileError),

    /// Grid synthesis error.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// Feature extraction error.
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// Scaling, clustering, grade mapping or persistence error.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Sample discovery or loading error.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Too few usable samples to form at least two grades.
    #[error("insufficient samples: {usable} usable, need at least {required}")]
    InsufficientSamples {
        /// Samples that produced a feature vector.
        usable: usize,
        /// Minimum required.
        required: usize,
    },

    /// Invalid configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl GradingError {
    /// Creates an invalid configuration error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Creates an insufficient samples error.
    #[must_use]
    pub const fn insufficient_samples(usable: usize, required: usize) -> Self {
        Self::InsufficientSamples { usable, required }
    }

    /// Classifies the error for reports.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Tactile(err) => match err {
                TactileError::MalformedSample { .. }
                | TactileError::ChannelCountMismatch { .. }
                | TactileError::EmptySample(_) => FailureKind::MalformedSample,
                TactileError::InvalidGeometry(_) => FailureKind::Geometry,
                TactileError::Io(_) => FailureKind::Io,
            },
            Self::Grid(err) => match err {
                GridError::DegenerateGeometry { .. } => FailureKind::Geometry,
                GridError::ChannelCountMismatch { .. } => FailureKind::MalformedSample,
                GridError::InvalidConfig(_) => FailureKind::InvalidConfig,
                GridError::GradeOutOfRange { .. } => FailureKind::Other,
            },
            Self::Feature(err) => match err {
                FeatureError::InsufficientData { .. } => FailureKind::InsufficientData,
                FeatureError::NonFiniteFeature { .. } => FailureKind::MalformedSample,
                FeatureError::InvalidConfig(_) | FeatureError::UnknownFeature(_) => {
                    FailureKind::InvalidConfig
                }
            },
            Self::Model(err) => match err {
                ModelError::NotTrained(_) => FailureKind::ModelNotTrained,
                ModelError::NotLoaded => FailureKind::ModelNotLoaded,
                ModelError::ClusteringDegenerate(_) | ModelError::EmptyCluster(_) => {
                    FailureKind::ClusteringDegenerate
                }
                ModelError::InvalidConfig(_) => FailureKind::InvalidConfig,
                ModelError::LoadCheckpoint { .. }
                | ModelError::SaveCheckpoint { .. }
                | ModelError::CheckpointNotFound(_)
                | ModelError::UnsupportedFormat(_)
                | ModelError::InvalidMagic(_)
                | ModelError::UnsupportedVersion { .. }
                | ModelError::InvalidBundle(_)
                | ModelError::Serialization(_) => FailureKind::Persistence,
                ModelError::Io(_) => FailureKind::Io,
                ModelError::InvalidInput(_)
                | ModelError::ShapeMismatch { .. }
                | ModelError::EmptyInput(_)
                | ModelError::UnknownCluster { .. } => FailureKind::Other,
            },
            Self::Dataset(err) => match err {
                DatasetError::MalformedSample { .. } => FailureKind::MalformedSample,
                DatasetError::SampleNotFound(_)
                | DatasetError::DirectoryNotFound(_)
                | DatasetError::EmptyDataset(_)
                | DatasetError::Io(_) => FailureKind::Io,
            },
            Self::InsufficientSamples { .. } => FailureKind::InsufficientSamples,
            Self::InvalidConfig(_) => FailureKind::InvalidConfig,
            Self::Io(_) => FailureKind::Io,
            Self::Serialization(_) => FailureKind::Persistence,
        }
    }
}

impl From<std::io::Error> for GradingError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

impl From<serde_json::Error> for GradingError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Coarse failure category written to result reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Sample does not follow the frame schema.
    MalformedSample,
    /// Too few usable frames in a sample.
    InsufficientData,
    /// Too few usable samples to train.
    InsufficientSamples,
    /// A component was used before fitting.
    ModelNotTrained,
    /// No model is loaded.
    ModelNotLoaded,
    /// Clustering produced an empty cluster on every attempt.
    ClusteringDegenerate,
    /// Contact geometry is unusable.
    Geometry,
    /// Model file could not be written or read back.
    Persistence,
    /// Configuration rejected.
    InvalidConfig,
    /// Filesystem error.
    Io,
    /// Anything else.
    Other,
}

impl FailureKind {
    /// Returns the report label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MalformedSample => "malformed_sample",
            Self::InsufficientData => "insufficient_data",
            Self::InsufficientSamples => "insufficient_samples",
            Self::ModelNotTrained => "model_not_trained",
            Self::ModelNotLoaded => "model_not_loaded",
            Self::ClusteringDegenerate => "clustering_degenerate",
            Self::Geometry => "geometry",
            Self::Persistence => "persistence",
            Self::InvalidConfig => "invalid_config",
            Self::Io => "io",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result type for grading operations.
pub type Result<T> = std::result::Result<T, GradingError>;
