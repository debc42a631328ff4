//! The named, fixed layout of a feature vector.

use serde::{Deserialize, Serialize};

use crate::error::{FeatureError, Result};

/// Number of features produced for every sample.
pub const FEATURE_DIM: usize = 45;

/// Feature names in vector order.
///
/// The first 30 entries are `mean, std, min, max, slope` for each wrench
/// channel `fx fy fz tx ty tz`; the rest summarize load, press mechanics,
/// torque and contact distribution.
pub const FEATURE_NAMES: [&str; FEATURE_DIM] = [
    "fx_mean",
    "fx_std",
    "fx_min",
    "fx_max",
    "fx_slope",
    "fy_mean",
    "fy_std",
    "fy_min",
    "fy_max",
    "fy_slope",
    "fz_mean",
    "fz_std",
    "fz_min",
    "fz_max",
    "fz_slope",
    "tx_mean",
    "tx_std",
    "tx_min",
    "tx_max",
    "tx_slope",
    "ty_mean",
    "ty_std",
    "ty_min",
    "ty_max",
    "ty_slope",
    "tz_mean",
    "tz_std",
    "tz_min",
    "tz_max",
    "tz_slope",
    "load_ramp",
    "peak_load",
    "stiffness",
    "work_done",
    "torque_trend",
    "torque_mean_magnitude",
    "tx_sign_consistency",
    "ty_sign_consistency",
    "tz_sign_consistency",
    "contact_mean",
    "contact_variance",
    "contact_p90",
    "contact_area",
    "contact_centroid_x",
    "contact_centroid_y",
];

/// Returns the column of a feature name.
///
/// # Example
///
/// ```
/// use grading_features::feature_index;
///
/// assert_eq!(feature_index("fx_mean"), Some(0));
/// assert_eq!(feature_index("load_ramp"), Some(30));
/// assert_eq!(feature_index("nope"), None);
/// ```
#[must_use]
pub fn feature_index(name: &str) -> Option<usize> {
    FEATURE_NAMES.iter().position(|n| *n == name)
}

/// Returns the column of a feature name, or an error naming it.
///
/// # Errors
///
/// Returns [`FeatureError::UnknownFeature`] if the name is not in the layout.
pub fn require_feature(name: &str) -> Result<usize> {
    feature_index(name).ok_or_else(|| FeatureError::unknown_feature(name))
}

/// One sample's features in [`FEATURE_NAMES`] order.
///
/// # Example
///
/// ```
/// use grading_features::{FeatureVector, FEATURE_DIM};
///
/// let v = FeatureVector::new(vec![0.0; FEATURE_DIM]);
/// assert_eq!(v.len(), FEATURE_DIM);
/// assert_eq!(v.get("peak_load"), Some(0.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    /// Wraps raw values.
    #[must_use]
    pub const fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    /// Returns the values in layout order.
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.0
    }

    /// Returns the value of a named feature.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<f64> {
        feature_index(name).and_then(|i| self.0.get(i).copied())
    }

    /// Returns the number of values.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Unwraps the raw values.
    #[must_use]
    pub fn into_values(self) -> Vec<f64> {
        self.0
    }
}

impl AsRef<[f64]> for FeatureVector {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn names_are_unique() {
        let unique: HashSet<_> = FEATURE_NAMES.iter().collect();
        assert_eq!(unique.len(), FEATURE_DIM);
    }

    #[test]
    fn wrench_block_layout() {
        assert_eq!(feature_index("fz_slope"), Some(14));
        assert_eq!(feature_index("tz_slope"), Some(29));
        assert_eq!(feature_index("contact_centroid_y"), Some(FEATURE_DIM - 1));
    }

    #[test]
    fn require_feature_errors() {
        assert_eq!(require_feature("stiffness").unwrap_or_default(), 32);
        assert!(matches!(
            require_feature("shore_a"),
            Err(FeatureError::UnknownFeature(name)) if name == "shore_a"
        ));
    }

    #[test]
    fn vector_serializes_as_array() {
        let v = FeatureVector::from(vec![1.0, 2.0]);
        assert_eq!(serde_json::to_string(&v).unwrap_or_default(), "[1.0,2.0]");
        assert_eq!(v.into_values(), vec![1.0, 2.0]);
    }
}
