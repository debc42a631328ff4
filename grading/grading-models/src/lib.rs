//! Unsupervised grading models for press-test hardness.
//!
//! This crate turns feature vectors into ordinal hardness grades:
//!
//! # Model Components
//!
//! - [`FeatureScaler`] - Per-feature z-score standardization
//! - [`ClusteringEngine`] - Seeded k-means with k-means++ restarts
//! - [`GradeMapper`] - Orders clusters by a stiffness proxy into grades `1..=k`
//! - [`ModelBundle`] - The three fitted parts, versioned as one unit
//!
//! # Persistence
//!
//! - [`ModelStore`] - Atomically replaceable holder of the active bundle
//! - [`save_bundle`] / [`load_bundle`] - JSON or binary (`HGM1`) checkpoints
//!
//! # Layer 0 Crate
//!
//! This crate has no sensor or IO-format dependencies. It can be used in:
//! - Training pipelines
//! - Streaming predictors
//! - CLI tools
//!
//! # Example
//!
//! ```
//! use grading_models::{ClusteringConfig, ClusteringEngine, FeatureScaler, GradeMapper};
//!
//! // Proxy feature in column 0: two soft and two hard specimens.
//! let corpus = vec![
//!     vec![1.0, 0.2],
//!     vec![1.1, 0.2],
//!     vec![9.0, 0.2],
//!     vec![9.2, 0.2],
//! ];
//!
//! let mut scaler = FeatureScaler::new();
//! scaler.fit(&corpus).unwrap();
//! let scaled = scaler.apply_all(&corpus).unwrap();
//!
//! let mut engine = ClusteringEngine::new(ClusteringConfig::default()).unwrap();
//! let assignments = engine.fit(&scaled, 2).unwrap();
//!
//! let mut mapper = GradeMapper::new();
//! let model = engine.model().unwrap();
//! mapper.fit(model, &assignments, &corpus, 0).unwrap();
//!
//! assert_eq!(mapper.apply(assignments[0]).unwrap(), 1);
//! assert_eq!(mapper.apply(assignments[3]).unwrap(), 2);
//! ```
//!
//! # Quality Standards
//!
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod bundle;
mod checkpoint;
mod error;
mod grades;
mod kmeans;
mod scaler;
mod store;

// Re-export model types
pub use grades::{GradeMap, GradeMapper};
pub use kmeans::{ClusterFit, ClusterModel, ClusteringConfig, ClusteringEngine};
pub use scaler::{FeatureScaler, MIN_STD, ScalerParams};

// Re-export bundle and persistence types
pub use bundle::{Assessment, BUNDLE_VERSION, ModelBundle};
pub use checkpoint::{
    CHECKPOINT_MAGIC, CheckpointFormat, load_bundle, read_binary, save_bundle, write_binary,
};
pub use store::ModelStore;

// Re-export error types
pub use error::{ModelError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        Assessment, CheckpointFormat, ClusterModel, ClusteringConfig, ClusteringEngine,
        FeatureScaler, GradeMap, GradeMapper, ModelBundle, ModelError, ModelStore, load_bundle,
        save_bundle,
    };
}
