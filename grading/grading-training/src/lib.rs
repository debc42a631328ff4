//! Training and inference pipeline for press-test hardness grading.
//!
//! This crate ties the leaf crates together into the two data flows of the
//! grading tool:
//!
//! - **Training**: samples → features (parallel) → scaler → k-means →
//!   grade map → persisted and published [`ModelBundle`](grading_models::ModelBundle)
//!   → per-sample grades and grids.
//! - **Inference**: sample → features → bundle assessment → grid.
//!
//! # Components
//!
//! - [`GradingConfig`] - All pipeline settings, loadable from JSON
//! - [`Trainer`] - One-pass unsupervised training
//! - [`Predictor`] - Single-sample, single-file and batch grading
//! - [`ReportWriter`] - CSV and JSON result artifacts
//! - [`silhouette_score`], [`feature_importance`] - Partition diagnostics
//!
//! # Failure Isolation
//!
//! A sample that cannot be loaded or has too few usable frames becomes a
//! [`SampleFailure`] carrying a [`FailureKind`]; the run continues. Only
//! model-level failures ([`GradingError::InsufficientSamples`], degenerate
//! clustering, persistence) abort training, and they do so before the
//! model store is touched.
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

mod config;
mod error;
mod inference;
mod metrics;
mod report;
mod trainer;

// Re-export configuration
pub use config::{ClusteringSection, GradingConfig, PathsConfig, RealtimeConfig};

// Re-export training
pub use trainer::{MIN_TRAINING_SAMPLES, Trainer, TrainingOutcome};

// Re-export inference
pub use inference::{Predictor, SampleFailure, SampleOutcome, SampleResult};

// Re-export metrics
pub use metrics::{
    ClusteringSummary, FeatureImportance, GradeEntry, feature_importance, silhouette_score,
};

// Re-export reports
pub use report::{ASSESSMENT_FILE, BATCH_FILE, IMPORTANCE_FILE, ReportWriter, SUMMARY_FILE};

// Re-export error types
pub use error::{FailureKind, GradingError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        ClusteringSummary, FailureKind, GradingConfig, GradingError, Predictor, ReportWriter,
        SampleOutcome, SampleResult, Trainer, TrainingOutcome,
    };
}
