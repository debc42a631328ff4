//! `hardness check`: is the environment ready to train and predict?

use anyhow::{Context, Result, bail};
use grading_dataset::list_samples;
use grading_models::load_bundle;
use grading_training::{GradingConfig, MIN_TRAINING_SAMPLES};
use owo_colors::OwoColorize;
use tactile_types::ContactGeometry;

pub fn run(config: &GradingConfig) -> Result<()> {
    let paths = &config.paths;

    println!();
    println!("{}", "Environment Check".bold());
    println!("{}", "=================".bold());
    println!();

    let mut all_passed = true;

    // 1. Samples
    println!("{}", "Scanning data directory...".dimmed());
    let samples = check_samples(config);
    all_passed &= report_result("Data directory", &samples);

    // 2. Geometry
    println!("{}", "Loading contact geometry...".dimmed());
    let geometry = ContactGeometry::load(&paths.geometry_file)
        .map(|g| format!("{} channels in {}", g.len(), paths.geometry_file.display()))
        .with_context(|| format!("{}", paths.geometry_file.display()));
    all_passed &= report_result("Geometry", &geometry);

    // 3. Model (optional until prediction)
    println!("{}", "Loading model...".dimmed());
    match load_bundle(&paths.model_file) {
        Ok(bundle) => println!(
            "  {} Model - {} grades over {} features ({})",
            "✓".green(),
            bundle.num_grades(),
            bundle.dim(),
            paths.model_file.display()
        ),
        Err(e) => println!(
            "  {} Model - {} (run `hardness train`)",
            "⚠".yellow(),
            e
        ),
    }

    // 4. Output
    if paths.output_dir.is_dir() {
        println!("  {} Output - {}", "✓".green(), paths.output_dir.display());
    } else {
        println!(
            "  {} Output - {} will be created",
            "⚠".yellow(),
            paths.output_dir.display()
        );
    }

    println!();
    if all_passed {
        println!("{}", "✓ Ready to train.".green().bold());
        Ok(())
    } else {
        println!("{}", "✗ Some checks failed.".red().bold());
        bail!("environment check failed")
    }
}

fn check_samples(config: &GradingConfig) -> Result<String> {
    let dir = &config.paths.data_dir;
    let count = list_samples(dir)
        .with_context(|| format!("{}", dir.display()))?
        .len();
    if count < MIN_TRAINING_SAMPLES {
        bail!(
            "{count} sample files in {}, training needs at least {MIN_TRAINING_SAMPLES}",
            dir.display()
        );
    }
    Ok(format!("{count} sample files in {}", dir.display()))
}

/// Prints one line for a check and returns whether it passed.
fn report_result(name: &str, result: &Result<String>) -> bool {
    match result {
        Ok(detail) => {
            println!("  {} {} - {}", "✓".green(), name, detail);
            true
        }
        Err(e) => {
            println!("  {} {} - {:#}", "✗".red(), name, e);
            false
        }
    }
}
