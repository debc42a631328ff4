//! Applying a trained bundle to samples.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use grading_dataset::load_sample;
use grading_features::{FEATURE_NAMES, FeatureExtractor, FeatureVector};
use grading_models::ModelBundle;
use rayon::prelude::*;
use serde::Serialize;
use tactile_grid::{GridSynthesizer, HardnessGrid, InterpolationGap};
use tactile_types::{Sample, SampleId};
use tracing::{debug, warn};

use crate::error::{FailureKind, GradingError, Result};

/// Grade, distance and grids of one successfully processed sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SampleResult {
    /// Sample identifier.
    pub id: SampleId,
    /// Grade, `1..=k`.
    pub grade: usize,
    /// Raw cluster index.
    pub cluster: usize,
    /// Distance to the cluster centroid in scaled feature space.
    pub distance: f64,
    /// Continuous hardness grid.
    pub grid: HardnessGrid,
    /// Grid rescaled into the grade band.
    pub scaled_grid: HardnessGrid,
    /// Lattice nodes with no contact point within the radius.
    pub gaps: Vec<InterpolationGap>,
}

/// A sample that could not be graded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleFailure {
    /// Sample identifier.
    pub id: SampleId,
    /// Failure category.
    pub kind: FailureKind,
    /// Human-readable reason.
    pub reason: String,
}

impl SampleFailure {
    /// Records an error against a sample.
    #[must_use]
    pub fn new(id: SampleId, err: &GradingError) -> Self {
        Self {
            id,
            kind: err.kind(),
            reason: err.to_string(),
        }
    }
}

/// Per-sample result of a training or batch pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SampleOutcome {
    /// The sample was graded.
    Graded(SampleResult),
    /// The sample was skipped.
    Failed(SampleFailure),
}

impl SampleOutcome {
    /// Returns the sample identifier.
    #[must_use]
    pub const fn id(&self) -> &SampleId {
        match self {
            Self::Graded(result) => &result.id,
            Self::Failed(failure) => &failure.id,
        }
    }

    /// Returns the result if the sample was graded.
    #[must_use]
    pub const fn result(&self) -> Option<&SampleResult> {
        match self {
            Self::Graded(result) => Some(result),
            Self::Failed(_) => None,
        }
    }

    /// Returns the failure if the sample was skipped.
    #[must_use]
    pub const fn failure(&self) -> Option<&SampleFailure> {
        match self {
            Self::Graded(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }

    /// Returns `true` if the sample was graded.
    #[must_use]
    pub const fn is_graded(&self) -> bool {
        matches!(self, Self::Graded(_))
    }
}

/// Feature extraction, bundle assessment and grid synthesis for one sample.
///
/// Holds a snapshot of the bundle; publishing a newer bundle to a
/// [`ModelStore`](grading_models::ModelStore) does not affect a predictor
/// that already exists.
#[derive(Debug, Clone)]
pub struct Predictor {
    extractor: Arc<FeatureExtractor>,
    synthesizer: Arc<GridSynthesizer>,
    bundle: Arc<ModelBundle>,
}

impl Predictor {
    /// Creates a predictor.
    ///
    /// # Errors
    ///
    /// Returns [`GradingError::InvalidConfig`] if the bundle was trained on
    /// a different feature layout than the extractor produces.
    pub fn new(
        extractor: Arc<FeatureExtractor>,
        synthesizer: Arc<GridSynthesizer>,
        bundle: Arc<ModelBundle>,
    ) -> Result<Self> {
        let layout_matches = bundle.feature_names.len() == FEATURE_NAMES.len()
            && bundle
                .feature_names
                .iter()
                .zip(FEATURE_NAMES)
                .all(|(a, b)| a == b);
        if !layout_matches {
            return Err(GradingError::invalid_config(format!(
                "model expects {} features that do not match the extractor layout",
                bundle.feature_names.len()
            )));
        }
        Ok(Self {
            extractor,
            synthesizer,
            bundle,
        })
    }

    /// Returns the bundle snapshot.
    #[must_use]
    pub const fn bundle(&self) -> &Arc<ModelBundle> {
        &self.bundle
    }

    /// Returns the feature extractor.
    #[must_use]
    pub fn extractor(&self) -> &FeatureExtractor {
        &self.extractor
    }

    /// Grades one sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the sample has too few usable frames or its
    /// channel profile cannot be interpolated.
    pub fn predict_sample(&self, sample: &Sample) -> Result<SampleResult> {
        let features = self.extractor.extract(sample)?;
        self.grade(sample, &features)
    }

    /// Loads and grades one sample file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file is missing or malformed, or if
    /// [`predict_sample`](Self::predict_sample) fails.
    pub fn predict_file(&self, path: impl AsRef<Path>) -> Result<SampleResult> {
        let sample = load_sample(path)?;
        self.predict_sample(&sample)
    }

    /// Grades sample files in parallel; failures are recorded, not raised.
    ///
    /// Outcomes keep the order of `paths`.
    pub fn predict_batch(&self, paths: &[PathBuf]) -> Vec<SampleOutcome> {
        paths
            .par_iter()
            .map(|path| match self.predict_file(path) {
                Ok(result) => SampleOutcome::Graded(result),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "sample skipped");
                    SampleOutcome::Failed(SampleFailure::new(SampleId::from_path(path), &err))
                }
            })
            .collect()
    }

    /// Grades a sample whose features are already extracted.
    pub(crate) fn grade(
        &self,
        sample: &Sample,
        features: &FeatureVector,
    ) -> Result<SampleResult> {
        let assessment = self.bundle.assess(features.values())?;
        let profile = self.extractor.channel_profile(sample)?;
        let synthesis = self.synthesizer.synthesize(&profile)?;
        let scaled_grid = synthesis.grade_scaled(assessment.grade, self.bundle.num_grades())?;

        debug!(
            sample = %sample.id(),
            grade = assessment.grade,
            cluster = assessment.cluster,
            distance = assessment.distance,
            gaps = synthesis.gaps().len(),
            "sample graded"
        );

        Ok(SampleResult {
            id: sample.id().clone(),
            grade: assessment.grade,
            cluster: assessment.cluster,
            distance: assessment.distance,
            grid: *synthesis.grid(),
            scaled_grid,
            gaps: synthesis.gaps().to_vec(),
        })
    }
}
