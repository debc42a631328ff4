//! Unsupervised training pass over a sample corpus.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use grading_dataset::{DatasetError, list_samples, load_sample};
use grading_features::{FEATURE_NAMES, FeatureExtractor, FeatureVector, require_feature};
use grading_models::{
    ClusterFit, ClusteringEngine, FeatureScaler, GradeMapper, ModelBundle, ModelError,
    ModelStore, save_bundle,
};
use rayon::prelude::*;
use tactile_grid::GridSynthesizer;
use tactile_types::{ContactGeometry, Sample, SampleId};
use tracing::{info, warn};

use crate::config::GradingConfig;
use crate::error::{GradingError, Result};
use crate::inference::{Predictor, SampleFailure, SampleOutcome};
use crate::metrics::{ClusteringSummary, FeatureImportance, feature_importance, silhouette_score};

/// Fewest usable samples that still allow two grades.
pub const MIN_TRAINING_SAMPLES: usize = 3;

/// Everything a training run produced.
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// The published bundle.
    pub bundle: Arc<ModelBundle>,
    /// Per-sample results, ordered by sample id.
    pub outcomes: Vec<SampleOutcome>,
    /// Partition summary.
    pub summary: ClusteringSummary,
    /// Features ranked by centroid spread.
    pub importance: Vec<FeatureImportance>,
    /// Where the bundle was written.
    pub model_path: PathBuf,
}

impl TrainingOutcome {
    /// Returns the number of graded samples.
    #[must_use]
    pub fn num_graded(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_graded()).count()
    }

    /// Returns the skipped samples.
    pub fn failures(&self) -> impl Iterator<Item = &SampleFailure> {
        self.outcomes.iter().filter_map(SampleOutcome::failure)
    }
}

/// A sample ready for fitting, or the reason it was skipped.
enum Prepared {
    Ready(Sample, FeatureVector),
    Skipped(SampleFailure),
}

/// Builds a [`ModelBundle`] from unlabeled samples.
///
/// One pass: parallel feature extraction, standardization, k-means over
/// the scaled vectors, grade ordering by the configured stiffness feature,
/// persistence, publication, then grading of every training sample with the
/// new bundle. A sample that fails to load or extract is recorded and left
/// out; any model-level failure aborts the run before anything is written
/// or published.
///
/// # Example
///
/// ```ignore
/// use std::sync::Arc;
/// use grading_models::ModelStore;
/// use grading_training::{GradingConfig, Trainer};
/// use tactile_types::ContactGeometry;
///
/// let config = GradingConfig::load("grading.json")?;
/// let geometry = Arc::new(ContactGeometry::load(&config.paths.geometry_file)?);
/// let trainer = Trainer::new(config, geometry)?;
///
/// let store = ModelStore::new();
/// let outcome = trainer.train(&store)?;
/// println!("{} samples graded", outcome.num_graded());
/// ```
#[derive(Debug, Clone)]
pub struct Trainer {
    config: GradingConfig,
    extractor: Arc<FeatureExtractor>,
    synthesizer: Arc<GridSynthesizer>,
}

impl Trainer {
    /// Creates a trainer.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the geometry
    /// cannot carry a lattice.
    pub fn new(config: GradingConfig, geometry: Arc<ContactGeometry>) -> Result<Self> {
        config.validate()?;
        let synthesizer = GridSynthesizer::new(&geometry, config.grid)?;
        let extractor = FeatureExtractor::new(config.features, geometry)?;
        Ok(Self {
            config,
            extractor: Arc::new(extractor),
            synthesizer: Arc::new(synthesizer),
        })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &GradingConfig {
        &self.config
    }

    /// Returns the shared feature extractor.
    #[must_use]
    pub const fn extractor(&self) -> &Arc<FeatureExtractor> {
        &self.extractor
    }

    /// Returns the shared grid synthesizer.
    #[must_use]
    pub const fn synthesizer(&self) -> &Arc<GridSynthesizer> {
        &self.synthesizer
    }

    /// Builds a predictor around a bundle with this trainer's extractor and
    /// synthesizer.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundle's feature layout does not match.
    pub fn predictor(&self, bundle: Arc<ModelBundle>) -> Result<Predictor> {
        Predictor::new(
            Arc::clone(&self.extractor),
            Arc::clone(&self.synthesizer),
            bundle,
        )
    }

    /// Trains on every sample file in the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory is missing or empty, fewer than
    /// [`MIN_TRAINING_SAMPLES`] samples are usable, clustering degenerates,
    /// or the bundle cannot be written.
    pub fn train(&self, store: &ModelStore) -> Result<TrainingOutcome> {
        let dir = &self.config.paths.data_dir;
        let paths = list_samples(dir)?;
        if paths.is_empty() {
            return Err(DatasetError::empty_dataset(dir.display().to_string()).into());
        }
        info!(dir = %dir.display(), samples = paths.len(), "training started");

        let prepared = paths
            .par_iter()
            .map(|path| self.prepare_file(path))
            .collect();
        self.fit(prepared, store)
    }

    /// Trains on samples already in memory.
    ///
    /// # Errors
    ///
    /// Same as [`train`](Self::train), minus the directory checks.
    pub fn train_samples(
        &self,
        samples: Vec<Sample>,
        store: &ModelStore,
    ) -> Result<TrainingOutcome> {
        info!(samples = samples.len(), "training started");
        let prepared = samples
            .into_par_iter()
            .map(|sample| self.prepare(sample))
            .collect();
        self.fit(prepared, store)
    }

    fn prepare_file(&self, path: &Path) -> Prepared {
        match load_sample(path) {
            Ok(sample) => self.prepare(sample),
            Err(err) => skip(SampleId::from_path(path), &err.into()),
        }
    }

    fn prepare(&self, sample: Sample) -> Prepared {
        match self.extractor.extract(&sample) {
            Ok(features) => Prepared::Ready(sample, features),
            Err(err) => skip(sample.id().clone(), &err.into()),
        }
    }

    fn fit(&self, prepared: Vec<Prepared>, store: &ModelStore) -> Result<TrainingOutcome> {
        let mut samples = Vec::new();
        let mut vectors = Vec::new();
        let mut failures = Vec::new();
        for item in prepared {
            match item {
                Prepared::Ready(sample, features) => {
                    samples.push(sample);
                    vectors.push(features);
                }
                Prepared::Skipped(failure) => failures.push(failure),
            }
        }

        let clustering = &self.config.clustering;
        let usable = vectors.len();
        let k = clustering.num_grades.min(usable.saturating_sub(1));
        if k < 2 {
            return Err(GradingError::insufficient_samples(
                usable,
                MIN_TRAINING_SAMPLES,
            ));
        }
        if k < clustering.num_grades {
            warn!(
                requested = clustering.num_grades,
                k, usable, "fewer samples than grades, reducing grade count"
            );
        }

        let mut scaler = FeatureScaler::new();
        scaler.fit(&vectors)?;
        let scaled = scaler.apply_all(&vectors)?;

        let mut engine = ClusteringEngine::new(clustering.engine)?;
        let ClusterFit {
            model,
            assignments,
            seed,
        } = engine.fit_partition(&scaled, k)?;

        let proxy_column = require_feature(&clustering.stiffness_feature)?;
        let mut mapper = GradeMapper::new();
        mapper.fit(&model, &assignments, &vectors, proxy_column)?;
        let grades = mapper
            .into_map()
            .ok_or_else(|| ModelError::not_trained("grade mapper"))?;

        let silhouette = silhouette_score(&scaled, &assignments, k);
        let bundle = ModelBundle::new(
            FEATURE_NAMES.iter().map(|name| (*name).to_string()).collect(),
            clustering.stiffness_feature.clone(),
            scaler,
            model,
            grades,
        )?;
        let summary =
            ClusteringSummary::new(&bundle, &assignments, failures.len(), seed, silhouette);
        let importance = feature_importance(&bundle);

        let model_path = self.config.paths.model_file.clone();
        save_bundle(&bundle, &model_path)?;
        let bundle = store.publish(bundle);

        info!(
            k,
            samples = usable,
            skipped = failures.len(),
            inertia = summary.inertia,
            silhouette = silhouette.unwrap_or(f64::NAN),
            counts = ?summary.grade_counts(),
            "model trained"
        );

        let predictor = self.predictor(Arc::clone(&bundle))?;
        let mut outcomes: Vec<SampleOutcome> = samples
            .par_iter()
            .zip(vectors.par_iter())
            .map(|(sample, features)| match predictor.grade(sample, features) {
                Ok(result) => SampleOutcome::Graded(result),
                Err(err) => {
                    warn!(sample = %sample.id(), error = %err, "grading failed");
                    SampleOutcome::Failed(SampleFailure::new(sample.id().clone(), &err))
                }
            })
            .collect();
        outcomes.extend(failures.into_iter().map(SampleOutcome::Failed));
        outcomes.sort_by(|a, b| a.id().cmp(b.id()));

        Ok(TrainingOutcome {
            bundle,
            outcomes,
            summary,
            importance,
            model_path,
        })
    }
}

fn skip(id: SampleId, err: &GradingError) -> Prepared {
    warn!(sample = %id, error = %err, "sample skipped");
    Prepared::Skipped(SampleFailure::new(id, err))
}
