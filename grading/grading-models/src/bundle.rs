//! The versioned, self-consistent trained model.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::grades::GradeMap;
use crate::kmeans::ClusterModel;
use crate::scaler::FeatureScaler;

/// Current bundle format version.
pub const BUNDLE_VERSION: u32 = 1;

/// Outcome of applying a bundle to one feature vector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Nearest cluster.
    pub cluster: usize,
    /// Grade of that cluster, `1..=k`.
    pub grade: usize,
    /// Euclidean distance to the cluster centroid in scaled space.
    pub distance: f64,
}

/// Scaler, clusters and grade map fitted together on one corpus.
///
/// The three parts are only meaningful as a unit: they are built by one
/// training run, persisted together and swapped into a
/// [`ModelStore`](crate::ModelStore) in one step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelBundle {
    /// Format version; must equal [`BUNDLE_VERSION`] to load.
    pub format_version: u32,
    /// Creation timestamp (Unix seconds).
    pub created_at: f64,
    /// Feature names in vector order.
    pub feature_names: Vec<String>,
    /// Feature whose per-cluster mean orders the grades.
    pub stiffness_feature: String,
    /// Fitted standardization.
    pub scaler: FeatureScaler,
    /// Fitted centroids in scaled space.
    pub clusters: ClusterModel,
    /// Cluster to grade mapping.
    pub grades: GradeMap,
}

impl ModelBundle {
    /// Assembles and validates a bundle stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidBundle`] if the parts disagree.
    pub fn new(
        feature_names: Vec<String>,
        stiffness_feature: impl Into<String>,
        scaler: FeatureScaler,
        clusters: ClusterModel,
        grades: GradeMap,
    ) -> Result<Self> {
        let created_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0.0, |d| d.as_secs_f64());
        let bundle = Self {
            format_version: BUNDLE_VERSION,
            created_at,
            feature_names,
            stiffness_feature: stiffness_feature.into(),
            scaler,
            clusters,
            grades,
        };
        bundle.validate()?;
        Ok(bundle)
    }

    /// Checks version, internal dimensions and parameter values.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnsupportedVersion`] or
    /// [`ModelError::InvalidBundle`] describing the first inconsistency.
    pub fn validate(&self) -> Result<()> {
        if self.format_version != BUNDLE_VERSION {
            return Err(ModelError::UnsupportedVersion {
                found: self.format_version,
                expected: BUNDLE_VERSION,
            });
        }

        let dim = self.feature_names.len();
        let params = self
            .scaler
            .params()
            .ok_or_else(|| ModelError::invalid_bundle("scaler is not fitted"))?;
        if params.dim() != dim || params.std.len() != dim {
            return Err(ModelError::invalid_bundle(format!(
                "scaler has {} features, bundle names {dim}",
                params.dim()
            )));
        }
        // Deserialization bypasses the constructors; rerun their checks.
        FeatureScaler::from_params(params.clone())
            .map_err(|e| ModelError::invalid_bundle(format!("scaler: {e}")))?;
        ClusterModel::new(self.clusters.centroids().to_vec(), self.clusters.inertia())
            .map_err(|e| ModelError::invalid_bundle(format!("centroids: {e}")))?;
        if self.clusters.dim() != dim {
            return Err(ModelError::invalid_bundle(format!(
                "centroids have {} features, bundle names {dim}",
                self.clusters.dim()
            )));
        }
        if self.grades.k() != self.clusters.k() {
            return Err(ModelError::invalid_bundle(format!(
                "grade map covers {} clusters, model has {}",
                self.grades.k(),
                self.clusters.k()
            )));
        }
        GradeMap::from_grades(
            self.grades.grades().to_vec(),
            self.grades.proxy_means().to_vec(),
        )
        .map_err(|e| ModelError::invalid_bundle(e.to_string()))?;
        if !self.feature_names.contains(&self.stiffness_feature) {
            return Err(ModelError::invalid_bundle(format!(
                "stiffness feature `{}` is not a bundle feature",
                self.stiffness_feature
            )));
        }
        Ok(())
    }

    /// Returns the number of grades.
    #[must_use]
    pub fn num_grades(&self) -> usize {
        self.grades.k()
    }

    /// Returns the feature dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.feature_names.len()
    }

    /// Scales, clusters and grades one raw feature vector.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] on a wrong dimension.
    pub fn assess(&self, features: &[f64]) -> Result<Assessment> {
        let scaled = self.scaler.apply(features)?;
        let (cluster, distance) = self.clusters.predict(&scaled)?;
        let grade = self.grades.apply(cluster)?;
        Ok(Assessment {
            cluster,
            grade,
            distance,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::scaler::ScalerParams;

    /// Two clusters on a 2-feature layout; cluster 1 is the stiffer one.
    pub(crate) fn sample_bundle() -> ModelBundle {
        let scaler = FeatureScaler::from_params(ScalerParams {
            mean: vec![10.0, 0.0],
            std: vec![2.0, 1.0],
        })
        .unwrap();
        let clusters = ClusterModel::new(vec![vec![1.0, 0.0], vec![-1.0, 0.0]], 3.5).unwrap();
        let grades = GradeMap::from_grades(vec![2, 1], vec![12.0, 8.0]).unwrap();
        ModelBundle::new(
            vec!["load_ramp".into(), "fz_mean".into()],
            "load_ramp",
            scaler,
            clusters,
            grades,
        )
        .unwrap()
    }

    #[test]
    fn bundle_assess() {
        let bundle = sample_bundle();
        // Scaled: (12 - 10) / 2 = 1 -> cluster 0 -> grade 2.
        let a = bundle.assess(&[12.0, 0.0]).unwrap();
        assert_eq!(a.cluster, 0);
        assert_eq!(a.grade, 2);
        assert!(a.distance.abs() < 1e-12);

        let b = bundle.assess(&[7.0, 0.0]).unwrap();
        assert_eq!(b.grade, 1);
        assert!((b.distance - 0.5).abs() < 1e-12);
    }

    #[test]
    fn bundle_rejects_wrong_dimension() {
        assert!(matches!(
            sample_bundle().assess(&[1.0]),
            Err(ModelError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn bundle_validate_version() {
        let mut bundle = sample_bundle();
        bundle.format_version = 99;
        assert!(matches!(
            bundle.validate(),
            Err(ModelError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn bundle_validate_dimensions() {
        let mut bundle = sample_bundle();
        bundle.feature_names.push("extra".into());
        assert!(matches!(bundle.validate(), Err(ModelError::InvalidBundle(_))));

        let mut bundle = sample_bundle();
        bundle.stiffness_feature = "stiffness".into();
        assert!(matches!(bundle.validate(), Err(ModelError::InvalidBundle(_))));

        let mut bundle = sample_bundle();
        bundle.scaler = FeatureScaler::new();
        assert!(bundle.validate().is_err());
    }

    #[test]
    fn bundle_metadata() {
        let bundle = sample_bundle();
        assert_eq!(bundle.num_grades(), 2);
        assert_eq!(bundle.dim(), 2);
        assert_eq!(bundle.format_version, BUNDLE_VERSION);
        assert!(bundle.created_at > 0.0);
    }
}
