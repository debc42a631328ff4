//! `hardness train`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use grading_models::ModelStore;
use grading_training::{GradingConfig, ReportWriter, TrainingOutcome};
use owo_colors::OwoColorize;

use crate::context;

/// Command-line values that take precedence over the configuration file.
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub grades: Option<usize>,
    pub seed: Option<u64>,
}

impl Overrides {
    fn apply(&self, mut config: GradingConfig) -> GradingConfig {
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        if let Some(dir) = &self.output_dir {
            config = config.with_output_dir(dir);
        }
        if let Some(k) = self.grades {
            config = config.with_num_grades(k);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        config
    }
}

pub fn run(config: GradingConfig, overrides: &Overrides) -> Result<()> {
    let config = overrides.apply(config);
    let trainer = context::trainer(config)?;
    let paths = &trainer.config().paths;

    println!();
    println!("{}", "Hardness Training".bold());
    println!("{}", "=================".bold());
    println!();
    println!("{}", format!("Data: {}", paths.data_dir.display()).dimmed());

    let store = ModelStore::new();
    let outcome = trainer
        .train(&store)
        .with_context(|| format!("Training on {} failed", paths.data_dir.display()))?;

    let files = ReportWriter::new(&paths.output_dir)
        .write_training(&outcome)
        .with_context(|| format!("Failed to write reports to {}", paths.output_dir.display()))?;

    print_summary(&outcome);
    println!();
    println!(
        "{} model saved to {}",
        "✓".green(),
        outcome.model_path.display()
    );
    println!(
        "{} {} files written to {}",
        "✓".green(),
        files.len(),
        paths.output_dir.display()
    );
    Ok(())
}

fn print_summary(outcome: &TrainingOutcome) {
    let summary = &outcome.summary;

    println!(
        "Graded {} of {} samples into {} grades (proxy: {})",
        outcome.num_graded().to_string().bold(),
        outcome.outcomes.len(),
        summary.num_grades,
        summary.stiffness_feature
    );
    println!();
    println!("  {:<8} {:<8} {:>8} {:>14}", "Grade", "Cluster", "Samples", "Proxy mean");
    println!("  {}", "-".repeat(41).dimmed());
    for entry in &summary.grades {
        println!(
            "  {:<8} {:<8} {:>8} {:>14.4}",
            entry.grade.to_string().cyan(),
            entry.cluster,
            entry.count,
            entry.proxy_mean
        );
    }
    println!();

    match summary.silhouette {
        Some(score) => println!("Silhouette: {score:.4}"),
        None => println!("Silhouette: {}", "n/a".dimmed()),
    }

    let top: Vec<&str> = outcome
        .importance
        .iter()
        .take(5)
        .map(|f| f.feature.as_str())
        .collect();
    println!("Most discriminating features: {}", top.join(", "));

    for failure in outcome.failures() {
        println!(
            "  {} {} [{}] {}",
            "⚠".yellow(),
            failure.id,
            failure.kind,
            failure.reason.dimmed()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_only_given_values() {
        let overrides = Overrides {
            data_dir: Some("lab".into()),
            output_dir: None,
            grades: Some(3),
            seed: None,
        };
        let config = overrides.apply(GradingConfig::default());

        assert_eq!(config.paths.data_dir, PathBuf::from("lab"));
        assert_eq!(config.paths.output_dir, GradingConfig::default().paths.output_dir);
        assert_eq!(config.clustering.num_grades, 3);
        assert_eq!(config.clustering.engine.seed, 42);
    }
}
