//! Feature extraction configuration.

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};

/// How a sample's frames are reduced to one value per contact channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelReduction {
    /// Mean over all usable frames.
    #[default]
    Mean,

    /// Values of the frame with the largest force magnitude.
    PeakLoad,
}

/// Configuration for [`FeatureExtractor`](crate::FeatureExtractor).
///
/// # Example
///
/// ```
/// use grading_features::{ChannelReduction, FeatureConfig};
///
/// let config = FeatureConfig::default()
///     .with_min_frames(10)
///     .with_channel_reduction(ChannelReduction::PeakLoad);
///
/// assert_eq!(config.min_frames, 10);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Minimum number of usable frames per sample.
    pub min_frames: usize,

    /// Channel mean at or above which a contact point counts as active.
    pub activation_threshold: f64,

    /// Vertical force below which the press is considered started.
    pub press_start_force: f64,

    /// Per-channel reduction fed to grid synthesis.
    pub channel_reduction: ChannelReduction,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            min_frames: 5,
            activation_threshold: 10.0,
            press_start_force: -0.5,
            channel_reduction: ChannelReduction::Mean,
        }
    }
}

impl FeatureConfig {
    /// Sets the minimum usable frame count.
    #[must_use]
    pub const fn with_min_frames(mut self, min_frames: usize) -> Self {
        self.min_frames = min_frames;
        self
    }

    /// Sets the contact activation threshold.
    #[must_use]
    pub const fn with_activation_threshold(mut self, threshold: f64) -> Self {
        self.activation_threshold = threshold;
        self
    }

    /// Sets the press start force.
    #[must_use]
    pub const fn with_press_start_force(mut self, force: f64) -> Self {
        self.press_start_force = force;
        self
    }

    /// Sets the channel reduction.
    #[must_use]
    pub const fn with_channel_reduction(mut self, reduction: ChannelReduction) -> Self {
        self.channel_reduction = reduction;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::InvalidConfig`] if `min_frames` is zero or a
    /// threshold is not finite.
    pub fn validate(&self) -> Result<()> {
        if self.min_frames == 0 {
            return Err(FeatureError::invalid_config("min_frames must be at least 1"));
        }
        if !self.activation_threshold.is_finite() {
            return Err(FeatureError::invalid_config(
                "activation_threshold must be finite",
            ));
        }
        if !self.press_start_force.is_finite() {
            return Err(FeatureError::invalid_config("press_start_force must be finite"));
        }
        Ok(())
    }
}
