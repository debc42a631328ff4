//! Ordinal relabeling of clusters.
//!
//! k-means labels are arbitrary. The grade mapper ranks clusters by the mean
//! of a stiffness-proxy feature among their members and assigns grades
//! `1..=k` in ascending order, so grade 1 is always the softest group.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ModelError, Result};
use crate::kmeans::ClusterModel;

/// Bijection from cluster index `0..k` to grade `1..=k`.
///
/// # Example
///
/// ```
/// use grading_models::GradeMap;
///
/// let map = GradeMap::from_grades(vec![2, 3, 1], vec![5.0, 9.0, 1.0]).unwrap();
/// assert_eq!(map.apply(2).unwrap(), 1);
/// assert_eq!(map.cluster_for_grade(3), Some(1));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeMap {
    grades: Vec<usize>,
    proxy_means: Vec<f64>,
}

impl GradeMap {
    /// Creates a map from per-cluster grades and proxy means.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidInput`] unless `grades` is a permutation
    /// of `1..=k` and `proxy_means` has one entry per cluster.
    pub fn from_grades(grades: Vec<usize>, proxy_means: Vec<f64>) -> Result<Self> {
        if proxy_means.len() != grades.len() {
            return Err(ModelError::shape_mismatch(grades.len(), proxy_means.len()));
        }
        let mut seen = vec![false; grades.len()];
        for &g in &grades {
            if g == 0 || g > grades.len() || seen[g - 1] {
                return Err(ModelError::invalid_input(format!(
                    "grades {grades:?} are not a permutation of 1..={}",
                    grades.len()
                )));
            }
            seen[g - 1] = true;
        }
        Ok(Self {
            grades,
            proxy_means,
        })
    }

    /// Returns the number of grades.
    #[must_use]
    pub fn k(&self) -> usize {
        self.grades.len()
    }

    /// Returns the grade of each cluster, indexed by cluster.
    #[must_use]
    pub fn grades(&self) -> &[usize] {
        &self.grades
    }

    /// Returns the proxy mean of each cluster, indexed by cluster.
    #[must_use]
    pub fn proxy_means(&self) -> &[f64] {
        &self.proxy_means
    }

    /// Returns the grade of a cluster.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::UnknownCluster`] if the index is out of range.
    pub fn apply(&self, cluster: usize) -> Result<usize> {
        self.grades
            .get(cluster)
            .copied()
            .ok_or_else(|| ModelError::unknown_cluster(cluster, self.k()))
    }

    /// Returns the cluster carrying a grade.
    #[must_use]
    pub fn cluster_for_grade(&self, grade: usize) -> Option<usize> {
        self.grades.iter().position(|&g| g == grade)
    }
}

/// Fits and applies a [`GradeMap`].
#[derive(Debug, Clone, Default)]
pub struct GradeMapper {
    map: Option<GradeMap>,
}

impl GradeMapper {
    /// Creates an unfitted mapper.
    #[must_use]
    pub const fn new() -> Self {
        Self { map: None }
    }

    /// Wraps an existing map.
    #[must_use]
    pub const fn from_map(map: GradeMap) -> Self {
        Self { map: Some(map) }
    }

    /// Returns the fitted map.
    #[must_use]
    pub const fn map(&self) -> Option<&GradeMap> {
        self.map.as_ref()
    }

    /// Takes the fitted map out of the mapper.
    #[must_use]
    pub fn into_map(self) -> Option<GradeMap> {
        self.map
    }

    /// Ranks the clusters of `model` by the mean of `proxy_column` among
    /// their members.
    ///
    /// Ties in the mean resolve by ascending cluster index; NaN means sort
    /// after every number.
    ///
    /// # Errors
    ///
    /// - [`ModelError::ShapeMismatch`] if assignments and vectors differ in
    ///   count or `proxy_column` is outside the vectors
    /// - [`ModelError::UnknownCluster`] for an assignment outside the model
    /// - [`ModelError::EmptyCluster`] if a cluster has no members
    #[allow(clippy::cast_precision_loss)]
    pub fn fit<V: AsRef<[f64]>>(
        &mut self,
        model: &ClusterModel,
        assignments: &[usize],
        vectors: &[V],
        proxy_column: usize,
    ) -> Result<&GradeMap> {
        if assignments.len() != vectors.len() {
            return Err(ModelError::shape_mismatch(vectors.len(), assignments.len()));
        }

        let k = model.k();
        let mut sums = vec![0.0; k];
        let mut counts = vec![0usize; k];
        for (&cluster, vector) in assignments.iter().zip(vectors) {
            let vector = vector.as_ref();
            let value = *vector
                .get(proxy_column)
                .ok_or_else(|| ModelError::shape_mismatch(proxy_column + 1, vector.len()))?;
            if cluster >= k {
                return Err(ModelError::unknown_cluster(cluster, k));
            }
            sums[cluster] += value;
            counts[cluster] += 1;
        }

        if let Some(empty) = counts.iter().position(|&c| c == 0) {
            return Err(ModelError::EmptyCluster(empty));
        }

        let proxy_means: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .map(|(s, &c)| s / c as f64)
            .collect();

        let mut order: Vec<usize> = (0..k).collect();
        order.sort_by(|&a, &b| {
            proxy_means[a]
                .total_cmp(&proxy_means[b])
                .then_with(|| a.cmp(&b))
        });

        let mut grades = vec![0; k];
        for (rank, &cluster) in order.iter().enumerate() {
            grades[cluster] = rank + 1;
        }
        debug!(?grades, ?proxy_means, "grade map fitted");

        Ok(self.map.insert(GradeMap {
            grades,
            proxy_means,
        }))
    }

    /// Returns the grade of a cluster.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotTrained`] before fitting and
    /// [`ModelError::UnknownCluster`] if the index is out of range.
    pub fn apply(&self, cluster: usize) -> Result<usize> {
        self.map
            .as_ref()
            .ok_or_else(|| ModelError::not_trained("grade mapper"))?
            .apply(cluster)
    }
}
