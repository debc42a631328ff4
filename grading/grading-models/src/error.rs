//! Error types for grading-models crate.

use thiserror::Error;

/// Errors that can occur in model fitting, inference and persistence.
#[derive(Debug, Error)]
pub enum ModelError {
    /// A component was used before it was fitted or loaded.
    #[error("model not trained: {0}")]
    NotTrained(String),

    /// The model store holds no bundle.
    #[error("no model loaded")]
    NotLoaded,

    /// Clustering could not produce `k` non-empty clusters.
    #[error("clustering degenerate: {0}")]
    ClusteringDegenerate(String),

    /// Invalid model configuration.
    #[error("invalid model configuration: {0}")]
    InvalidConfig(String),

    /// Input contains values the model cannot use.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Vector dimension does not match the model.
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Fitting was given no vectors.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// A cluster has no members, so it cannot be ranked.
    #[error("cluster {0} has no members")]
    EmptyCluster(usize),

    /// Cluster index outside the fitted model.
    #[error("unknown cluster {cluster}: model has {num_clusters} clusters")]
    UnknownCluster {
        /// Requested cluster.
        cluster: usize,
        /// Number of clusters in the model.
        num_clusters: usize,
    },

    /// Failed to load checkpoint.
    #[error("failed to load checkpoint from {path}: {reason}")]
    LoadCheckpoint {
        /// Path to the checkpoint file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to save checkpoint.
    #[error("failed to save checkpoint to {path}: {reason}")]
    SaveCheckpoint {
        /// Path to the checkpoint file.
        path: String,
        /// Reason for failure.
        reason: String,
    },

    /// Checkpoint file not found.
    #[error("checkpoint not found: {0}")]
    CheckpointNotFound(String),

    /// Unsupported checkpoint format.
    #[error("unsupported checkpoint format: {0}")]
    UnsupportedFormat(String),

    /// Binary checkpoint does not start with the expected magic bytes.
    #[error("invalid checkpoint magic: {0:?}")]
    InvalidMagic([u8; 4]),

    /// Checkpoint was written by an incompatible format version.
    #[error("unsupported checkpoint version {found}, expected {expected}")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
        /// Version this build reads.
        expected: u32,
    },

    /// Loaded bundle is internally inconsistent.
    #[error("invalid model bundle: {0}")]
    InvalidBundle(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl ModelError {
    /// Creates a not trained error.
    #[must_use]
    pub fn not_trained(component: impl Into<String>) -> Self {
        Self::NotTrained(component.into())
    }

    /// Creates a degenerate clustering error.
    #[must_use]
    pub fn clustering_degenerate(reason: impl Into<String>) -> Self {
        Self::ClusteringDegenerate(reason.into())
    }

    /// Creates an invalid config error.
    #[must_use]
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }

    /// Creates an invalid input error.
    #[must_use]
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }

    /// Creates a shape mismatch error.
    #[must_use]
    pub const fn shape_mismatch(expected: usize, actual: usize) -> Self {
        Self::ShapeMismatch { expected, actual }
    }

    /// Creates an empty input error.
    #[must_use]
    pub fn empty_input(what: impl Into<String>) -> Self {
        Self::EmptyInput(what.into())
    }

    /// Creates an unknown cluster error.
    #[must_use]
    pub const fn unknown_cluster(cluster: usize, num_clusters: usize) -> Self {
        Self::UnknownCluster {
            cluster,
            num_clusters,
        }
    }

    /// Creates a load checkpoint error.
    #[must_use]
    pub fn load_checkpoint(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LoadCheckpoint {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a save checkpoint error.
    #[must_use]
    pub fn save_checkpoint(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SaveCheckpoint {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a checkpoint not found error.
    #[must_use]
    pub fn checkpoint_not_found(path: impl Into<String>) -> Self {
        Self::CheckpointNotFound(path.into())
    }

    /// Creates an unsupported format error.
    #[must_use]
    pub fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat(format.into())
    }

    /// Creates an invalid bundle error.
    #[must_use]
    pub fn invalid_bundle(reason: impl Into<String>) -> Self {
        Self::InvalidBundle(reason.into())
    }

    /// Creates a serialization error.
    #[must_use]
    pub fn serialization(reason: impl Into<String>) -> Self {
        Self::Serialization(reason.into())
    }
}

impl From<std::io::Error> for ModelError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Result type for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_not_trained() {
        let err = ModelError::not_trained("scaler");
        assert!(err.to_string().contains("not trained"));
        assert!(err.to_string().contains("scaler"));
    }

    #[test]
    fn error_not_loaded() {
        assert_eq!(ModelError::NotLoaded.to_string(), "no model loaded");
    }

    #[test]
    fn error_clustering_degenerate() {
        let err = ModelError::clustering_degenerate("k = 5 exceeds 3 samples");
        assert!(err.to_string().contains("degenerate"));
        assert!(err.to_string().contains("k = 5"));
    }

    #[test]
    fn error_shape_mismatch() {
        let err = ModelError::shape_mismatch(45, 44);
        assert!(err.to_string().contains("45"));
        assert!(err.to_string().contains("44"));
    }

    #[test]
    fn error_unknown_cluster() {
        let err = ModelError::unknown_cluster(7, 4);
        assert!(err.to_string().contains("unknown cluster 7"));
        assert!(err.to_string().contains("4 clusters"));
    }

    #[test]
    fn error_empty_cluster() {
        assert!(ModelError::EmptyCluster(2).to_string().contains("cluster 2"));
    }

    #[test]
    fn error_checkpoint() {
        let err = ModelError::load_checkpoint("/models/m.bin", "truncated");
        assert!(err.to_string().contains("failed to load"));
        assert!(err.to_string().contains("/models/m.bin"));

        let err = ModelError::UnsupportedVersion {
            found: 9,
            expected: 1,
        };
        assert!(err.to_string().contains("version 9"));
    }

    #[test]
    fn error_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ModelError = io_err.into();
        assert!(matches!(err, ModelError::Io(_)));
    }
}
