//! Partition quality and model summaries.

use grading_models::ModelBundle;
use serde::{Deserialize, Serialize};

/// Mean silhouette coefficient of a partition, in `[-1, 1]`.
///
/// Members of singleton clusters score 0. Returns `None` unless there are
/// at least two clusters and more points than clusters, or if the
/// assignments do not match the data.
///
/// # Example
///
/// ```
/// use grading_training::silhouette_score;
///
/// let data = vec![vec![0.0], vec![0.1], vec![10.0], vec![10.1]];
/// let score = silhouette_score(&data, &[0, 0, 1, 1], 2).unwrap();
/// assert!(score > 0.95);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn silhouette_score<V: AsRef<[f64]>>(
    data: &[V],
    assignments: &[usize],
    k: usize,
) -> Option<f64> {
    let n = data.len();
    if k < 2 || n <= k || assignments.len() != n || assignments.iter().any(|&a| a >= k) {
        return None;
    }

    let mut sizes = vec![0usize; k];
    for &a in assignments {
        sizes[a] += 1;
    }

    let mut total = 0.0;
    for (i, point) in data.iter().enumerate() {
        let own = assignments[i];
        if sizes[own] < 2 {
            continue;
        }

        let mut sums = vec![0.0; k];
        for (j, other) in data.iter().enumerate() {
            if i != j {
                sums[assignments[j]] += euclidean(point.as_ref(), other.as_ref());
            }
        }

        let a = sums[own] / (sizes[own] - 1) as f64;
        let b = (0..k)
            .filter(|&c| c != own && sizes[c] > 0)
            .map(|c| sums[c] / sizes[c] as f64)
            .fold(f64::INFINITY, f64::min);
        if !b.is_finite() {
            continue;
        }

        let denom = a.max(b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }

    Some(total / n as f64)
}

fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}

/// How strongly one feature separates the cluster centroids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Feature name.
    pub feature: String,
    /// Population standard deviation of the feature across centroids, in
    /// scaled units.
    pub spread: f64,
    /// 1-based rank, 1 being the most separating feature.
    pub rank: usize,
}

/// Ranks features by their spread across the bundle's centroids.
///
/// Ties keep the feature layout order.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn feature_importance(bundle: &ModelBundle) -> Vec<FeatureImportance> {
    let centroids = bundle.clusters.centroids();
    let k = centroids.len() as f64;

    let mut ranked: Vec<(String, f64)> = bundle
        .feature_names
        .iter()
        .enumerate()
        .map(|(j, name)| {
            let mean = centroids.iter().map(|c| c[j]).sum::<f64>() / k;
            let variance = centroids.iter().map(|c| (c[j] - mean).powi(2)).sum::<f64>() / k;
            (name.clone(), variance.sqrt())
        })
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    ranked
        .into_iter()
        .enumerate()
        .map(|(i, (feature, spread))| FeatureImportance {
            feature,
            spread,
            rank: i + 1,
        })
        .collect()
}

/// One row of the grade table in a [`ClusteringSummary`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeEntry {
    /// Grade, `1..=k`.
    pub grade: usize,
    /// Cluster carrying this grade.
    pub cluster: usize,
    /// Mean stiffness proxy of the cluster's training members.
    pub proxy_mean: f64,
    /// Training samples assigned this grade.
    pub count: usize,
}

/// Machine-readable description of a trained model and its partition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusteringSummary {
    /// Number of grades actually fitted.
    pub num_grades: usize,
    /// Samples used for fitting.
    pub num_samples: usize,
    /// Samples skipped during extraction.
    pub num_failed: usize,
    /// Seed of the winning k-means round.
    pub seed: u64,
    /// Within-cluster sum of squares in scaled space.
    pub inertia: f64,
    /// Mean silhouette of the training partition.
    pub silhouette: Option<f64>,
    /// Feature ordering the grades.
    pub stiffness_feature: String,
    /// Feature names in vector order.
    pub feature_names: Vec<String>,
    /// Centroids in scaled space, by cluster index.
    pub centroids: Vec<Vec<f64>>,
    /// Grades in ascending order.
    pub grades: Vec<GradeEntry>,
}

impl ClusteringSummary {
    /// Summarizes a bundle and its training partition.
    ///
    /// `assignments` are the training cluster indices of the fitted samples.
    #[must_use]
    pub fn new(
        bundle: &ModelBundle,
        assignments: &[usize],
        num_failed: usize,
        seed: u64,
        silhouette: Option<f64>,
    ) -> Self {
        let k = bundle.num_grades();
        let mut counts = vec![0usize; k];
        for &a in assignments {
            if let Some(count) = counts.get_mut(a) {
                *count += 1;
            }
        }

        let map = &bundle.grades;
        let grades = (1..=k)
            .filter_map(|grade| {
                let cluster = map.cluster_for_grade(grade)?;
                Some(GradeEntry {
                    grade,
                    cluster,
                    proxy_mean: map.proxy_means()[cluster],
                    count: counts[cluster],
                })
            })
            .collect();

        Self {
            num_grades: k,
            num_samples: assignments.len(),
            num_failed,
            seed,
            inertia: bundle.clusters.inertia(),
            silhouette,
            stiffness_feature: bundle.stiffness_feature.clone(),
            feature_names: bundle.feature_names.clone(),
            centroids: bundle.clusters.centroids().to_vec(),
            grades,
        }
    }

    /// Returns the number of training samples per grade, ascending.
    #[must_use]
    pub fn grade_counts(&self) -> Vec<usize> {
        self.grades.iter().map(|g| g.count).collect()
    }
}
