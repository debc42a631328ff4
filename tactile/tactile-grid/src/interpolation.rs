//! Spatial interpolation kernels and their configuration.

use serde::{Deserialize, Serialize};

use crate::error::{GridError, Result};

/// Distance below which a lattice node is treated as coinciding with a
/// contact point.
pub const EXACT_HIT_DISTANCE: f64 = 1e-12;

/// Method for spreading contact-channel values onto lattice nodes.
///
/// # Example
///
/// ```
/// use tactile_grid::InterpolationMethod;
///
/// let method = InterpolationMethod::default();
/// assert_eq!(method, InterpolationMethod::InverseDistance);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterpolationMethod {
    /// Inverse-distance weighting over points within the search radius.
    #[default]
    InverseDistance,

    /// Value of the single nearest contact point.
    Nearest,
}

impl InterpolationMethod {
    /// Returns true if this method blends several points.
    #[must_use]
    pub const fn is_weighted(&self) -> bool {
        matches!(self, Self::InverseDistance)
    }
}

/// Configuration for grid synthesis.
///
/// # Example
///
/// ```
/// use tactile_grid::{GridConfig, InterpolationMethod};
///
/// let config = GridConfig::default()
///     .with_radius(2.5)
///     .with_method(InterpolationMethod::Nearest);
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Interpolation kernel.
    pub method: InterpolationMethod,
    /// Search radius in geometry units.
    pub radius: f64,
    /// Distance exponent for inverse-distance weighting.
    pub power: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            method: InterpolationMethod::InverseDistance,
            radius: 3.0,
            power: 2.0,
        }
    }
}

impl GridConfig {
    /// Sets the interpolation kernel.
    #[must_use]
    pub const fn with_method(mut self, method: InterpolationMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the search radius.
    #[must_use]
    pub const fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    /// Sets the distance exponent.
    #[must_use]
    pub const fn with_power(mut self, power: f64) -> Self {
        self.power = power;
        self
    }

    /// Checks that radius and power are positive and finite.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::InvalidConfig`] naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if !(self.radius.is_finite() && self.radius > 0.0) {
            return Err(GridError::invalid_config(format!(
                "radius must be positive, got {}",
                self.radius
            )));
        }
        if !(self.power.is_finite() && self.power > 0.0) {
            return Err(GridError::invalid_config(format!(
                "power must be positive, got {}",
                self.power
            )));
        }
        Ok(())
    }
}

/// Inverse-distance weight for a point at distance `distance`.
#[must_use]
pub(crate) fn idw_weight(distance: f64, power: f64) -> f64 {
    distance.powf(power).recip()
}
