//! Feature extraction for press-test hardness grading.
//!
//! Reduces a [`Sample`](tactile_types::Sample) of raw frames to a
//! 45-dimensional [`FeatureVector`] with a fixed, named layout:
//!
//! # Feature Groups
//!
//! - Wrench statistics: mean, std, min, max and slope of each of
//!   `fx fy fz tx ty tz`
//! - Load: `load_ramp`, `peak_load`
//! - Press mechanics: `stiffness`, `work_done`
//! - Torque: `torque_trend`, `torque_mean_magnitude`, per-axis sign consistency
//! - Contact: mean, variance, 90th percentile, active area and centroid
//!
//! Frames with any non-finite value are dropped before extraction; a
//! sample with fewer than `min_frames` usable frames is rejected with
//! [`FeatureError::InsufficientData`].
//!
//! # Layer 1 Crate
//!
//! Depends only on `tactile-types`. Used by training, batch prediction and
//! the streaming predictor.
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
mod extractor;
mod layout;
pub mod stats;

// Re-export layout types
pub use layout::{FEATURE_DIM, FEATURE_NAMES, FeatureVector, feature_index, require_feature};

// Re-export extraction types
pub use config::{ChannelReduction, FeatureConfig};
pub use extractor::FeatureExtractor;

// Re-export error types
pub use error::{FeatureError, Result};
