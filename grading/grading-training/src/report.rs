//! Result artifacts written after training or batch prediction.
//!
//! | File | Content |
//! |---|---|
//! | `hardness_assessment_results.csv` | one row per training sample |
//! | `<sample>_hardness_grid_9x11.csv` | continuous grid, 9 rows of 11 values |
//! | `<sample>_hardness_grid_9x11_scaled.csv` | grid rescaled into the grade band |
//! | `clustering_summary.json` | [`ClusteringSummary`] |
//! | `feature_importance.csv` | features ranked by centroid spread |
//! | `batch_prediction_results.csv` | one row per batch sample |

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tactile_grid::HardnessGrid;
use tracing::info;

use crate::error::Result;
use crate::inference::{SampleOutcome, SampleResult};
use crate::metrics::{ClusteringSummary, FeatureImportance};
use crate::trainer::TrainingOutcome;

/// Per-sample results of a training run.
pub const ASSESSMENT_FILE: &str = "hardness_assessment_results.csv";

/// Model summary of a training run.
pub const SUMMARY_FILE: &str = "clustering_summary.json";

/// Feature ranking of a training run.
pub const IMPORTANCE_FILE: &str = "feature_importance.csv";

/// Per-sample results of a batch prediction.
pub const BATCH_FILE: &str = "batch_prediction_results.csv";

const OUTCOME_HEADER: &str = "sample,status,grade,cluster,distance,reason";

/// Writes result artifacts into one directory, creating it on first use.
#[derive(Debug, Clone)]
pub struct ReportWriter {
    dir: PathBuf,
}

impl ReportWriter {
    /// Creates a writer for a directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Writes every artifact of a training run and returns the paths.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be written.
    pub fn write_training(&self, outcome: &TrainingOutcome) -> Result<Vec<PathBuf>> {
        let mut written = vec![
            self.write_outcomes(ASSESSMENT_FILE, &outcome.outcomes)?,
            self.write_summary(&outcome.summary)?,
            self.write_importance(&outcome.importance)?,
        ];
        for result in outcome.outcomes.iter().filter_map(SampleOutcome::result) {
            let (grid, scaled) = self.write_grids(result)?;
            written.push(grid);
            written.push(scaled);
        }
        info!(dir = %self.dir.display(), files = written.len(), "training report written");
        Ok(written)
    }

    /// Writes the batch prediction table and every grid.
    ///
    /// # Errors
    ///
    /// Returns an error if any file cannot be written.
    pub fn write_batch(&self, outcomes: &[SampleOutcome]) -> Result<Vec<PathBuf>> {
        let mut written = vec![self.write_outcomes(BATCH_FILE, outcomes)?];
        for result in outcomes.iter().filter_map(SampleOutcome::result) {
            let (grid, scaled) = self.write_grids(result)?;
            written.push(grid);
            written.push(scaled);
        }
        info!(dir = %self.dir.display(), files = written.len(), "batch report written");
        Ok(written)
    }

    /// Writes a per-sample table with one row per outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_outcomes(&self, name: &str, outcomes: &[SampleOutcome]) -> Result<PathBuf> {
        let path = self.path(name)?;
        let mut out = BufWriter::new(File::create(&path)?);
        writeln!(out, "{OUTCOME_HEADER}")?;
        for outcome in outcomes {
            match outcome {
                SampleOutcome::Graded(r) => writeln!(
                    out,
                    "{},graded,{},{},{:.6},",
                    csv_field(r.id.as_str()),
                    r.grade,
                    r.cluster,
                    r.distance
                )?,
                SampleOutcome::Failed(f) => writeln!(
                    out,
                    "{},{},,,,{}",
                    csv_field(f.id.as_str()),
                    f.kind,
                    csv_field(&f.reason)
                )?,
            }
        }
        out.flush()?;
        Ok(path)
    }

    /// Writes the continuous and grade-scaled grids of one sample.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be written.
    pub fn write_grids(&self, result: &SampleResult) -> Result<(PathBuf, PathBuf)> {
        let stem = format!("{}_hardness_grid_9x11", result.id);
        let grid = self.path(&format!("{stem}.csv"))?;
        write_grid(&grid, &result.grid)?;
        let scaled = self.path(&format!("{stem}_scaled.csv"))?;
        write_grid(&scaled, &result.scaled_grid)?;
        Ok((grid, scaled))
    }

    /// Writes the clustering summary as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_summary(&self, summary: &ClusteringSummary) -> Result<PathBuf> {
        let path = self.path(SUMMARY_FILE)?;
        fs::write(&path, serde_json::to_string_pretty(summary)?)?;
        Ok(path)
    }

    /// Writes the feature ranking.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn write_importance(&self, importance: &[FeatureImportance]) -> Result<PathBuf> {
        let path = self.path(IMPORTANCE_FILE)?;
        let mut out = BufWriter::new(File::create(&path)?);
        writeln!(out, "feature,spread,rank")?;
        for entry in importance {
            writeln!(out, "{},{:.6},{}", entry.feature, entry.spread, entry.rank)?;
        }
        out.flush()?;
        Ok(path)
    }

    fn path(&self, name: &str) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        Ok(self.dir.join(name))
    }
}

/// Writes a grid as 9 comma-separated lines of 11 values.
fn write_grid(path: &Path, grid: &HardnessGrid) -> Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for row in grid.row_iter() {
        let line: Vec<String> = row.iter().map(|v| format!("{v:.6}")).collect();
        writeln!(out, "{}", line.join(","))?;
    }
    out.flush()?;
    Ok(())
}

/// Quotes a field if it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
