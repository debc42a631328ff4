//! Per-feature standardization.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Standard deviation at or below which a feature is treated as constant.
pub const MIN_STD: f64 = 1e-12;

/// Fitted per-feature `(mean, std)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    /// Per-feature mean.
    pub mean: Vec<f64>,
    /// Per-feature population standard deviation, never below [`MIN_STD`].
    pub std: Vec<f64>,
}

impl ScalerParams {
    /// Returns the feature dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.mean.len()
    }
}

/// Z-score standardization fitted on a training corpus.
///
/// # Example
///
/// ```
/// use grading_models::FeatureScaler;
///
/// let mut scaler = FeatureScaler::new();
/// scaler.fit(&[vec![1.0, 5.0], vec![3.0, 5.0]]).unwrap();
///
/// let z = scaler.apply(&[3.0, 5.0]).unwrap();
/// assert!((z[0] - 1.0).abs() < 1e-12);
/// // Constant features have their std clamped to 1.
/// assert!(z[1].abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureScaler {
    params: Option<ScalerParams>,
}

impl FeatureScaler {
    /// Creates an unfitted scaler.
    #[must_use]
    pub const fn new() -> Self {
        Self { params: None }
    }

    /// Creates a scaler from previously fitted parameters.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] if mean and std differ in
    /// length, or [`ModelError::InvalidInput`] if a std is not positive or
    /// a mean is not finite.
    pub fn from_params(params: ScalerParams) -> Result<Self> {
        if params.mean.len() != params.std.len() {
            return Err(ModelError::shape_mismatch(params.mean.len(), params.std.len()));
        }
        if params.std.iter().any(|s| !(s.is_finite() && *s > 0.0)) {
            return Err(ModelError::invalid_input("scaler std must be positive"));
        }
        if params.mean.iter().any(|m| !m.is_finite()) {
            return Err(ModelError::invalid_input("scaler mean must be finite"));
        }
        Ok(Self {
            params: Some(params),
        })
    }

    /// Returns `true` once fitted or loaded.
    #[must_use]
    pub const fn is_fitted(&self) -> bool {
        self.params.is_some()
    }

    /// Returns the fitted parameters.
    #[must_use]
    pub const fn params(&self) -> Option<&ScalerParams> {
        self.params.as_ref()
    }

    /// Fits mean and population std over the corpus.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::EmptyInput`] for an empty corpus and
    /// [`ModelError::ShapeMismatch`] if vectors differ in length.
    #[allow(clippy::cast_precision_loss)]
    pub fn fit<V: AsRef<[f64]>>(&mut self, vectors: &[V]) -> Result<()> {
        let first = vectors
            .first()
            .ok_or_else(|| ModelError::empty_input("scaler corpus is empty"))?;
        let dim = first.as_ref().len();
        if let Some(bad) = vectors.iter().find(|v| v.as_ref().len() != dim) {
            return Err(ModelError::shape_mismatch(dim, bad.as_ref().len()));
        }

        let n = vectors.len() as f64;
        let mut mean = vec![0.0; dim];
        for v in vectors {
            for (m, x) in mean.iter_mut().zip(v.as_ref()) {
                *m += x;
            }
        }
        for m in &mut mean {
            *m /= n;
        }

        let mut var = vec![0.0; dim];
        for v in vectors {
            for ((s, x), m) in var.iter_mut().zip(v.as_ref()).zip(&mean) {
                *s += (x - m).powi(2);
            }
        }
        let std = var
            .into_iter()
            .map(|s| {
                let sd = (s / n).sqrt();
                if sd.is_finite() && sd > MIN_STD { sd } else { 1.0 }
            })
            .collect();

        self.params = Some(ScalerParams { mean, std });
        Ok(())
    }

    /// Standardizes one vector: `(v - mean) / std`.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotTrained`] before fitting and
    /// [`ModelError::ShapeMismatch`] on a wrong dimension.
    pub fn apply(&self, vector: &[f64]) -> Result<Vec<f64>> {
        let params = self
            .params
            .as_ref()
            .ok_or_else(|| ModelError::not_trained("feature scaler"))?;
        if vector.len() != params.dim() {
            return Err(ModelError::shape_mismatch(params.dim(), vector.len()));
        }
        Ok(vector
            .iter()
            .zip(params.mean.iter().zip(&params.std))
            .map(|(x, (m, s))| (x - m) / s)
            .collect())
    }

    /// Standardizes every vector of a corpus.
    ///
    /// # Errors
    ///
    /// Same as [`apply`](Self::apply).
    pub fn apply_all<V: AsRef<[f64]>>(&self, vectors: &[V]) -> Result<Vec<Vec<f64>>> {
        vectors.iter().map(|v| self.apply(v.as_ref())).collect()
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn scaler_unfitted() {
        let scaler = FeatureScaler::new();
        assert!(!scaler.is_fitted());
        assert!(matches!(
            scaler.apply(&[1.0]),
            Err(ModelError::NotTrained(_))
        ));
    }

    #[test]
    fn scaler_fit_population_std() {
        let mut scaler = FeatureScaler::new();
        scaler
            .fit(&[vec![2.0], vec![4.0], vec![4.0], vec![4.0], vec![5.0], vec![5.0], vec![7.0], vec![9.0]])
            .unwrap();
        let params = scaler.params().unwrap();
        assert_relative_eq!(params.mean[0], 5.0);
        assert_relative_eq!(params.std[0], 2.0);
        assert_relative_eq!(scaler.apply(&[9.0]).unwrap()[0], 2.0);
    }

    #[test]
    fn scaler_zero_variance_clamped() {
        let mut scaler = FeatureScaler::new();
        scaler.fit(&[vec![3.0, 1.0], vec![3.0, 2.0]]).unwrap();
        assert_eq!(scaler.params().unwrap().std[0], 1.0);
        assert_eq!(scaler.apply(&[4.0, 1.5]).unwrap()[0], 1.0);
    }

    #[test]
    fn scaler_empty_corpus() {
        let mut scaler = FeatureScaler::new();
        let empty: Vec<Vec<f64>> = Vec::new();
        assert!(matches!(scaler.fit(&empty), Err(ModelError::EmptyInput(_))));
    }

    #[test]
    fn scaler_shape_mismatch() {
        let mut scaler = FeatureScaler::new();
        assert!(matches!(
            scaler.fit(&[vec![1.0, 2.0], vec![1.0]]),
            Err(ModelError::ShapeMismatch {
                expected: 2,
                actual: 1
            })
        ));

        scaler.fit(&[vec![1.0, 2.0]]).unwrap();
        assert!(matches!(
            scaler.apply(&[1.0, 2.0, 3.0]),
            Err(ModelError::ShapeMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }

    #[test]
    fn scaler_from_params_validates() {
        let ok = ScalerParams {
            mean: vec![0.0],
            std: vec![2.0],
        };
        assert!(FeatureScaler::from_params(ok).unwrap().is_fitted());

        let bad = ScalerParams {
            mean: vec![0.0],
            std: vec![0.0],
        };
        assert!(FeatureScaler::from_params(bad).is_err());

        let bad_mean = ScalerParams {
            mean: vec![f64::INFINITY],
            std: vec![1.0],
        };
        assert!(FeatureScaler::from_params(bad_mean).is_err());
    }

    #[test]
    fn scaler_apply_all() {
        let mut scaler = FeatureScaler::new();
        let corpus = vec![vec![0.0], vec![2.0]];
        scaler.fit(&corpus).unwrap();
        let scaled = scaler.apply_all(&corpus).unwrap();
        assert_relative_eq!(scaled[0][0], -1.0);
        assert_relative_eq!(scaled[1][0], 1.0);
    }
}
