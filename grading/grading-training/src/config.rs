//! Grading configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use grading_features::{FeatureConfig, require_feature};
use grading_models::ClusteringConfig;
use serde::{Deserialize, Serialize};
use tactile_grid::GridConfig;
use tracing::debug;

use crate::error::{GradingError, Result};

/// Full configuration of the grading pipeline.
///
/// Every section and field has a default, so a JSON file only needs the
/// values it changes.
///
/// # Example
///
/// ```
/// use grading_training::GradingConfig;
///
/// let config = GradingConfig::default().with_num_grades(5);
/// assert_eq!(config.clustering.num_grades, 5);
/// assert_eq!(config.clustering.stiffness_feature, "load_ramp");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GradingConfig {
    /// Input and output locations.
    pub paths: PathsConfig,

    /// Clustering and grade mapping.
    pub clustering: ClusteringSection,

    /// Feature extraction.
    pub features: FeatureConfig,

    /// Grid synthesis.
    pub grid: GridConfig,

    /// Real-time prediction.
    pub realtime: RealtimeConfig,
}

impl GradingConfig {
    /// Loads a configuration from a JSON file; missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// result fails [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        debug!(path = %path.display(), "loaded grading configuration");
        Ok(config)
    }

    /// Writes the configuration as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Sets the data directory.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.paths.data_dir = dir.into();
        self
    }

    /// Sets the geometry file.
    #[must_use]
    pub fn with_geometry_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.geometry_file = path.into();
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.paths.output_dir = dir.into();
        self
    }

    /// Sets the model file.
    #[must_use]
    pub fn with_model_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.paths.model_file = path.into();
        self
    }

    /// Sets the number of grades.
    #[must_use]
    pub fn with_num_grades(mut self, num_grades: usize) -> Self {
        self.clustering.num_grades = num_grades;
        self
    }

    /// Sets the clustering seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.clustering.engine.seed = seed;
        self
    }

    /// Sets the feature that orders the grades.
    #[must_use]
    pub fn with_stiffness_feature(mut self, name: impl Into<String>) -> Self {
        self.clustering.stiffness_feature = name.into();
        self
    }

    /// Sets the feature extraction settings.
    #[must_use]
    pub fn with_features(mut self, features: FeatureConfig) -> Self {
        self.features = features;
        self
    }

    /// Sets the grid settings.
    #[must_use]
    pub fn with_grid(mut self, grid: GridConfig) -> Self {
        self.grid = grid;
        self
    }

    /// Sets the real-time poll interval.
    #[must_use]
    pub fn with_poll_interval_ms(mut self, interval_ms: u64) -> Self {
        self.realtime.poll_interval_ms = interval_ms;
        self
    }

    /// Validates every section.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<()> {
        self.clustering.validate()?;
        self.features.validate()?;
        self.grid.validate()?;
        self.realtime.validate()?;
        Ok(())
    }
}

/// Input and output locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory of sample CSV files.
    pub data_dir: PathBuf,

    /// Contact geometry table.
    pub geometry_file: PathBuf,

    /// Directory for result artifacts.
    pub output_dir: PathBuf,

    /// Where the trained model is written and read.
    pub model_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            geometry_file: PathBuf::from("geometry.csv"),
            output_dir: PathBuf::from("results"),
            model_file: PathBuf::from("models/hardness_model.json"),
        }
    }
}

/// Clustering settings plus the grade count and ordering feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusteringSection {
    /// Requested number of grades (K); clamped to `n_samples - 1`.
    pub num_grades: usize,

    /// Feature whose per-cluster mean orders grades from soft to hard.
    pub stiffness_feature: String,

    /// k-means settings.
    #[serde(flatten)]
    pub engine: ClusteringConfig,
}

impl Default for ClusteringSection {
    fn default() -> Self {
        Self {
            num_grades: 4,
            stiffness_feature: "load_ramp".to_string(),
            engine: ClusteringConfig::default(),
        }
    }
}

impl ClusteringSection {
    /// Validates the section.
    ///
    /// # Errors
    ///
    /// Returns an error for fewer than two grades, an unknown stiffness
    /// feature, or invalid k-means settings.
    pub fn validate(&self) -> Result<()> {
        if self.num_grades < 2 {
            return Err(GradingError::invalid_config(format!(
                "num_grades must be at least 2, got {}",
                self.num_grades
            )));
        }
        require_feature(&self.stiffness_feature)?;
        self.engine.validate()?;
        Ok(())
    }
}

/// Real-time prediction settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RealtimeConfig {
    /// Pause between scans of the sample source.
    pub poll_interval_ms: u64,
}

impl Default for RealtimeConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
        }
    }
}

impl RealtimeConfig {
    /// Returns the poll interval.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Validates the section.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero interval.
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            return Err(GradingError::invalid_config(
                "poll_interval_ms must be positive",
            ));
        }
        Ok(())
    }
}
