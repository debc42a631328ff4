//! `hardness predict`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use grading_dataset::list_samples;
use grading_training::{GradingConfig, ReportWriter, SampleOutcome};
use owo_colors::OwoColorize;

use crate::context;

pub fn run(
    config: GradingConfig,
    path: &Path,
    model: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let config = match output_dir {
        Some(dir) => config.with_output_dir(dir),
        None => config,
    };
    let (_store, bundle) = context::load_model(&config, model)?;
    let trainer = context::trainer(config)?;
    let predictor = trainer.predictor(bundle)?;
    let writer = ReportWriter::new(&trainer.config().paths.output_dir);

    let outcomes = if path.is_dir() {
        let paths = list_samples(path)
            .with_context(|| format!("Failed to list {}", path.display()))?;
        let outcomes = predictor.predict_batch(&paths);
        writer
            .write_batch(&outcomes)
            .context("Failed to write batch results")?;
        outcomes
    } else {
        let result = predictor
            .predict_file(path)
            .with_context(|| format!("Failed to grade {}", path.display()))?;
        writer.write_grids(&result).context("Failed to write grids")?;
        vec![SampleOutcome::Graded(result)]
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&outcomes)?);
    } else {
        print_outcomes(&outcomes);
        println!();
        println!(
            "{} results written to {}",
            "✓".green(),
            writer.dir().display()
        );
    }
    Ok(())
}

fn print_outcomes(outcomes: &[SampleOutcome]) {
    for outcome in outcomes {
        match outcome {
            SampleOutcome::Graded(result) => println!(
                "  {} {:<32} grade {} (distance {:.4})",
                "✓".green(),
                result.id.as_str(),
                result.grade.to_string().bold(),
                result.distance
            ),
            SampleOutcome::Failed(failure) => println!(
                "  {} {:<32} {} {}",
                "✗".red(),
                failure.id.as_str(),
                failure.kind.to_string().red(),
                failure.reason.dimmed()
            ),
        }
    }
}
