//! Seeded k-means clustering.
//!
//! Seeding uses k-means++ over a `ChaCha8Rng`, so a fixed seed reproduces
//! the same partition on every platform. Each fit runs `n_init` restarts and
//! keeps the lowest-inertia partition in which every cluster has members.

use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ModelError, Result};

/// Configuration for [`ClusteringEngine`].
///
/// # Example
///
/// ```
/// use grading_models::ClusteringConfig;
///
/// let config = ClusteringConfig::default().with_seed(7).with_n_init(3);
/// assert_eq!(config.seed, 7);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringConfig {
    /// Base RNG seed; restart `r` of the first round uses `seed + r`.
    pub seed: u64,
    /// Restarts per round.
    pub n_init: usize,
    /// Lloyd iteration cap per restart.
    pub max_iterations: usize,
    /// Largest centroid shift considered converged.
    pub tolerance: f64,
    /// Extra rounds with shifted seeds when every restart is degenerate.
    pub max_seed_retries: usize,
}

impl Default for ClusteringConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            n_init: 10,
            max_iterations: 300,
            tolerance: 1e-6,
            max_seed_retries: 3,
        }
    }
}

impl ClusteringConfig {
    /// Sets the seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets the number of restarts.
    #[must_use]
    pub const fn with_n_init(mut self, n_init: usize) -> Self {
        self.n_init = n_init;
        self
    }

    /// Sets the iteration cap.
    #[must_use]
    pub const fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the convergence tolerance.
    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Sets the number of shifted-seed retry rounds.
    #[must_use]
    pub const fn with_max_seed_retries(mut self, retries: usize) -> Self {
        self.max_seed_retries = retries;
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] for zero restarts or iterations
    /// or a negative tolerance.
    pub fn validate(&self) -> Result<()> {
        if self.n_init == 0 {
            return Err(ModelError::invalid_config("n_init must be at least 1"));
        }
        if self.max_iterations == 0 {
            return Err(ModelError::invalid_config("max_iterations must be at least 1"));
        }
        if !(self.tolerance.is_finite() && self.tolerance >= 0.0) {
            return Err(ModelError::invalid_config("tolerance must be non-negative"));
        }
        Ok(())
    }
}

/// Fitted centroids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterModel {
    centroids: Vec<Vec<f64>>,
    inertia: f64,
}

impl ClusterModel {
    /// Creates a model from centroids.
    ///
    /// # Errors
    ///
    /// Returns an error if there are no centroids, their dimensions differ,
    /// or a coordinate is not finite.
    pub fn new(centroids: Vec<Vec<f64>>, inertia: f64) -> Result<Self> {
        let first = centroids
            .first()
            .ok_or_else(|| ModelError::empty_input("cluster model has no centroids"))?;
        let dim = first.len();
        if let Some(bad) = centroids.iter().find(|c| c.len() != dim) {
            return Err(ModelError::shape_mismatch(dim, bad.len()));
        }
        if centroids.iter().flatten().any(|x| !x.is_finite()) {
            return Err(ModelError::invalid_input("centroids contain non-finite values"));
        }
        Ok(Self { centroids, inertia })
    }

    /// Returns the number of clusters.
    #[must_use]
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Returns the feature dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.centroids.first().map_or(0, Vec::len)
    }

    /// Returns all centroids.
    #[must_use]
    pub fn centroids(&self) -> &[Vec<f64>] {
        &self.centroids
    }

    /// Returns the sum of squared distances of the training set to its
    /// assigned centroids.
    #[must_use]
    pub const fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Returns the nearest centroid and the Euclidean distance to it.
    ///
    /// Ties resolve to the lowest cluster index.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::ShapeMismatch`] on a wrong dimension and
    /// [`ModelError::InvalidInput`] for a non-finite vector.
    pub fn predict(&self, vector: &[f64]) -> Result<(usize, f64)> {
        if vector.len() != self.dim() {
            return Err(ModelError::shape_mismatch(self.dim(), vector.len()));
        }
        if vector.iter().any(|x| !x.is_finite()) {
            return Err(ModelError::invalid_input("vector contains non-finite values"));
        }
        let (index, d2) = nearest(vector, &self.centroids);
        Ok((index, d2.sqrt()))
    }
}

/// A fitted partition: the model and each training vector's cluster.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterFit {
    /// Fitted centroids.
    pub model: ClusterModel,
    /// Cluster index per training vector, in input order.
    pub assignments: Vec<usize>,
    /// Seed of the restart that produced the partition.
    pub seed: u64,
}

/// k-means clustering with seeded restarts.
///
/// # Example
///
/// ```
/// use grading_models::{ClusteringConfig, ClusteringEngine};
///
/// let data = vec![
///     vec![0.0, 0.0],
///     vec![0.1, 0.0],
///     vec![10.0, 10.0],
///     vec![10.1, 10.0],
/// ];
///
/// let mut engine = ClusteringEngine::new(ClusteringConfig::default()).unwrap();
/// let assignments = engine.fit(&data, 2).unwrap();
/// assert_eq!(assignments[0], assignments[1]);
/// assert_ne!(assignments[0], assignments[2]);
///
/// let (cluster, _distance) = engine.predict(&[9.9, 10.0]).unwrap();
/// assert_eq!(cluster, assignments[2]);
/// ```
#[derive(Debug, Clone)]
pub struct ClusteringEngine {
    config: ClusteringConfig,
    model: Option<ClusterModel>,
}

impl ClusteringEngine {
    /// Creates an engine.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: ClusteringConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            model: None,
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &ClusteringConfig {
        &self.config
    }

    /// Returns the fitted model, if any.
    #[must_use]
    pub const fn model(&self) -> Option<&ClusterModel> {
        self.model.as_ref()
    }

    /// Takes the fitted model out of the engine.
    #[must_use]
    pub fn into_model(self) -> Option<ClusterModel> {
        self.model
    }

    /// Fits `k` clusters and returns each vector's assignment.
    ///
    /// # Errors
    ///
    /// See [`fit_partition`](Self::fit_partition).
    pub fn fit<V: AsRef<[f64]>>(&mut self, data: &[V], k: usize) -> Result<Vec<usize>> {
        self.fit_partition(data, k).map(|fit| fit.assignments)
    }

    /// Fits `k` clusters and returns the full partition.
    ///
    /// # Errors
    ///
    /// - [`ModelError::EmptyInput`] for no data
    /// - [`ModelError::InvalidConfig`] for `k == 0`
    /// - [`ModelError::ShapeMismatch`] for ragged data
    /// - [`ModelError::InvalidInput`] for non-finite values
    /// - [`ModelError::ClusteringDegenerate`] if `k` exceeds the number of
    ///   vectors or no restart yields `k` non-empty clusters
    pub fn fit_partition<V: AsRef<[f64]>>(&mut self, data: &[V], k: usize) -> Result<ClusterFit> {
        let data: Vec<&[f64]> = data.iter().map(AsRef::as_ref).collect();
        validate_data(&data, k)?;

        let cfg = self.config;
        for round in 0..=cfg.max_seed_retries {
            let base = cfg.seed.wrapping_add((round * cfg.n_init) as u64);
            let mut best: Option<ClusterFit> = None;

            for restart in 0..cfg.n_init {
                let seed = base.wrapping_add(restart as u64);
                let Some((model, assignments)) = self.run(&data, k, seed) else {
                    debug!(seed, "restart left a cluster empty, discarded");
                    continue;
                };
                if best
                    .as_ref()
                    .is_none_or(|b| model.inertia() < b.model.inertia())
                {
                    best = Some(ClusterFit {
                        model,
                        assignments,
                        seed,
                    });
                }
            }

            if let Some(fit) = best {
                info!(
                    k,
                    samples = data.len(),
                    inertia = fit.model.inertia(),
                    seed = fit.seed,
                    "k-means converged"
                );
                self.model = Some(fit.model.clone());
                return Ok(fit);
            }
            warn!(round, "every restart degenerate, retrying with shifted seed");
        }

        Err(ModelError::clustering_degenerate(format!(
            "no restart produced {k} non-empty clusters from {} samples",
            data.len()
        )))
    }

    /// Predicts the nearest cluster and its distance.
    ///
    /// # Errors
    ///
    /// Returns [`ModelError::NotTrained`] before fitting and
    /// [`ModelError::ShapeMismatch`] on a wrong dimension.
    pub fn predict(&self, vector: &[f64]) -> Result<(usize, f64)> {
        self.model
            .as_ref()
            .ok_or_else(|| ModelError::not_trained("clustering engine"))?
            .predict(vector)
    }

    /// One seeded restart; `None` if it ends with an empty cluster.
    fn run(&self, data: &[&[f64]], k: usize, seed: u64) -> Option<(ClusterModel, Vec<usize>)> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut centroids = seed_plus_plus(data, k, &mut rng);
        let mut assignments = assign(data, &centroids);

        for _ in 0..self.config.max_iterations {
            let updated = update(data, &assignments, &centroids);
            let shift = centroids
                .iter()
                .zip(&updated)
                .map(|(a, b)| squared_distance(a, b).sqrt())
                .fold(0.0, f64::max);
            centroids = updated;

            let next = assign(data, &centroids);
            let stable = next == assignments;
            assignments = next;
            if stable || shift <= self.config.tolerance {
                break;
            }
        }

        let mut counts = vec![0usize; k];
        for &a in &assignments {
            counts[a] += 1;
        }
        if counts.contains(&0) {
            return None;
        }

        let inertia = data
            .iter()
            .zip(&assignments)
            .map(|(v, &a)| squared_distance(v, &centroids[a]))
            .sum();
        Some((
            ClusterModel {
                centroids,
                inertia,
            },
            assignments,
        ))
    }
}

fn validate_data(data: &[&[f64]], k: usize) -> Result<()> {
    let first = data
        .first()
        .ok_or_else(|| ModelError::empty_input("no vectors to cluster"))?;
    if k == 0 {
        return Err(ModelError::invalid_config("k must be at least 1"));
    }
    if k > data.len() {
        return Err(ModelError::clustering_degenerate(format!(
            "k = {k} exceeds {} samples",
            data.len()
        )));
    }
    let dim = first.len();
    if let Some(bad) = data.iter().find(|v| v.len() != dim) {
        return Err(ModelError::shape_mismatch(dim, bad.len()));
    }
    if data.iter().any(|v| v.iter().any(|x| !x.is_finite())) {
        return Err(ModelError::invalid_input("vectors contain non-finite values"));
    }
    Ok(())
}

/// k-means++ seeding: each next centroid drawn with probability
/// proportional to its squared distance from the chosen set.
fn seed_plus_plus(data: &[&[f64]], k: usize, rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(data[rng.gen_range(0..data.len())].to_vec());

    while centroids.len() < k {
        let weights: Vec<f64> = data.iter().map(|v| nearest(v, &centroids).1).collect();
        let index = match WeightedIndex::new(&weights) {
            Ok(dist) => dist.sample(rng),
            // Every point coincides with a centroid
            Err(_) => rng.gen_range(0..data.len()),
        };
        centroids.push(data[index].to_vec());
    }
    centroids
}

fn assign(data: &[&[f64]], centroids: &[Vec<f64>]) -> Vec<usize> {
    data.iter().map(|v| nearest(v, centroids).0).collect()
}

/// Mean of each cluster's members; an empty cluster keeps its centroid.
#[allow(clippy::cast_precision_loss)]
fn update(data: &[&[f64]], assignments: &[usize], centroids: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let dim = centroids.first().map_or(0, Vec::len);
    let mut sums = vec![vec![0.0; dim]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];

    for (v, &a) in data.iter().zip(assignments) {
        counts[a] += 1;
        for (s, x) in sums[a].iter_mut().zip(v.iter()) {
            *s += x;
        }
    }

    sums.into_iter()
        .zip(counts)
        .zip(centroids)
        .map(|((sum, count), old)| {
            if count == 0 {
                old.clone()
            } else {
                sum.into_iter().map(|s| s / count as f64).collect()
            }
        })
        .collect()
}

/// Index and squared distance of the nearest centroid; ties go to the
/// lowest index.
fn nearest(vector: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best = (0, f64::INFINITY);
    for (i, c) in centroids.iter().enumerate() {
        let d = squared_distance(vector, c);
        if d < best.1 {
            best = (i, d);
        }
    }
    best
}

pub(crate) fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}

#[cfg(test)]
#[allow(clippy::float_cmp, clippy::cast_precision_loss)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    /// Two tight, well-separated blobs in 3D.
    fn two_blobs() -> Vec<Vec<f64>> {
        let mut data = Vec::new();
        for i in 0..10 {
            let e = f64::from(i) * 0.01;
            data.push(vec![e, -e, 0.5 * e]);
            data.push(vec![20.0 + e, 20.0 - e, 20.0]);
        }
        data
    }

    fn engine() -> ClusteringEngine {
        ClusteringEngine::new(ClusteringConfig::default()).unwrap()
    }

    #[test]
    fn model_rejects_ragged_or_non_finite_centroids() {
        assert!(matches!(
            ClusterModel::new(vec![vec![0.0, 0.0], vec![1.0]], 0.0),
            Err(ModelError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            ClusterModel::new(vec![vec![0.0, f64::NAN]], 0.0),
            Err(ModelError::InvalidInput(_))
        ));
    }

    #[test]
    fn predict_rejects_non_finite_vector() {
        let model = ClusterModel::new(vec![vec![0.0, 0.0], vec![1.0, 1.0]], 0.0).unwrap();
        for bad in [[f64::NAN, 0.0], [0.0, f64::INFINITY]] {
            assert!(matches!(
                model.predict(&bad),
                Err(ModelError::InvalidInput(_))
            ));
        }
        assert_eq!(model.predict(&[0.9, 1.0]).unwrap().0, 1);
    }

    #[test]
    fn fit_separates_blobs() {
        let data = two_blobs();
        let assignments = engine().fit(&data, 2).unwrap();
        for pair in assignments.chunks(2) {
            assert_ne!(pair[0], pair[1]);
        }
        let first = assignments[0];
        assert!(assignments.iter().step_by(2).all(|&a| a == first));
    }

    #[test]
    fn fit_is_deterministic() {
        let data: Vec<Vec<f64>> = (0..40)
            .map(|i| {
                let x = f64::from(i);
                vec![(x * 0.37).sin() * 5.0, (x * 1.3).cos() * 3.0, x % 7.0]
            })
            .collect();

        let mut a = engine();
        let mut b = engine();
        let fit_a = a.fit_partition(&data, 4).unwrap();
        let fit_b = b.fit_partition(&data, 4).unwrap();
        assert_eq!(fit_a.assignments, fit_b.assignments);
        assert_eq!(fit_a.model.centroids(), fit_b.model.centroids());
        assert_eq!(fit_a.seed, fit_b.seed);
    }

    #[test]
    fn fit_k_equals_n() {
        let data = vec![vec![0.0], vec![1.0], vec![5.0]];
        let mut engine = engine();
        let fit = engine.fit_partition(&data, 3).unwrap();
        let mut sorted = fit.assignments.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1, 2]);
        assert_relative_eq!(fit.model.inertia(), 0.0);
    }

    #[test]
    fn fit_rejects_k_zero_and_k_above_n() {
        let data = vec![vec![0.0], vec![1.0]];
        assert!(matches!(
            engine().fit(&data, 0),
            Err(ModelError::InvalidConfig(_))
        ));
        assert!(matches!(
            engine().fit(&data, 3),
            Err(ModelError::ClusteringDegenerate(_))
        ));
    }

    #[test]
    fn fit_identical_points_is_degenerate() {
        let data = vec![vec![1.0, 1.0]; 6];
        let mut engine = ClusteringEngine::new(
            ClusteringConfig::default()
                .with_n_init(2)
                .with_max_seed_retries(1),
        )
        .unwrap();
        assert!(matches!(
            engine.fit(&data, 2),
            Err(ModelError::ClusteringDegenerate(_))
        ));
        assert!(engine.model().is_none());
    }

    #[test]
    fn fit_rejects_non_finite_and_ragged() {
        assert!(matches!(
            engine().fit(&[vec![0.0], vec![f64::NAN]], 1),
            Err(ModelError::InvalidInput(_))
        ));
        assert!(matches!(
            engine().fit(&[vec![0.0], vec![1.0, 2.0]], 1),
            Err(ModelError::ShapeMismatch { .. })
        ));
        let empty: Vec<Vec<f64>> = Vec::new();
        assert!(matches!(
            engine().fit(&empty, 1),
            Err(ModelError::EmptyInput(_))
        ));
    }

    #[test]
    fn predict_before_fit() {
        assert!(matches!(
            engine().predict(&[0.0]),
            Err(ModelError::NotTrained(_))
        ));
    }

    #[test]
    fn predict_distance_and_tie() {
        let model = ClusterModel::new(vec![vec![0.0, 0.0], vec![2.0, 0.0]], 0.0).unwrap();
        let (cluster, distance) = model.predict(&[1.0, 0.0]).unwrap();
        assert_eq!(cluster, 0);
        assert_relative_eq!(distance, 1.0);

        let (cluster, distance) = model.predict(&[5.0, 4.0]).unwrap();
        assert_eq!(cluster, 1);
        assert_relative_eq!(distance, 5.0);

        assert!(model.predict(&[1.0]).is_err());
    }

    #[test]
    fn best_restart_has_lowest_inertia() {
        let data = two_blobs();
        let fit = engine().fit_partition(&data, 2).unwrap();
        for restart in 0..10 {
            if let Some((model, _)) = engine().run(
                &data.iter().map(Vec::as_slice).collect::<Vec<_>>(),
                2,
                42 + restart,
            ) {
                assert!(fit.model.inertia() <= model.inertia());
            }
        }
    }

    #[test]
    fn config_validate() {
        assert!(ClusteringConfig::default().validate().is_ok());
        assert!(ClusteringConfig::default().with_n_init(0).validate().is_err());
        assert!(
            ClusteringConfig::default()
                .with_max_iterations(0)
                .validate()
                .is_err()
        );
        assert!(ClusteringConfig::default().with_tolerance(-1.0).validate().is_err());
    }
}
