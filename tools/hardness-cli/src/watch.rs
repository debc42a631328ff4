//! `hardness watch`.

use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::{Context, Result};
use grading_dataset::DirectorySource;
use grading_realtime::{CancellationToken, PredictionEvent, RealtimePredictor};
use grading_training::{GradingConfig, ReportWriter};
use owo_colors::OwoColorize;
use tracing::warn;

use crate::context;

pub fn run(
    config: GradingConfig,
    dir: Option<PathBuf>,
    model: Option<PathBuf>,
    poll_ms: Option<u64>,
    max_cycles: Option<usize>,
) -> Result<()> {
    let config = match poll_ms {
        Some(ms) => config.with_poll_interval_ms(ms),
        None => config,
    };
    let (store, _) = context::load_model(&config, model)?;
    let trainer = context::trainer(config)?;
    let settings = trainer.config();
    let dir = dir.unwrap_or_else(|| settings.paths.data_dir.clone());
    let writer = ReportWriter::new(&settings.paths.output_dir);

    let mut watcher = RealtimePredictor::start(
        &store,
        DirectorySource::new(&dir),
        Arc::clone(trainer.extractor()),
        Arc::clone(trainer.synthesizer()),
        settings.realtime,
    )
    .context("Failed to start watcher")?;

    let token = CancellationToken::new();
    spawn_stdin_stop(token.clone());

    println!();
    println!(
        "{} {} (press Enter to stop)",
        "Watching".bold(),
        dir.display()
    );
    println!();

    let stats = watcher.run_with_limit(&token, max_cycles, |event| match event {
        PredictionEvent::Graded(result) => {
            println!(
                "  {} {:<32} grade {}",
                "✓".green(),
                result.id.as_str(),
                result.grade.to_string().bold()
            );
            if let Err(err) = writer.write_grids(&result) {
                warn!(sample = %result.id, error = %err, "failed to write grids");
            }
        }
        PredictionEvent::Failed(failure) => println!(
            "  {} {:<32} {}",
            "✗".red(),
            failure.id.as_str(),
            failure.reason.dimmed()
        ),
    })?;

    println!();
    println!(
        "Stopped after {} scans: {} graded, {} failed",
        stats.cycles,
        stats.graded.to_string().green(),
        stats.failed.to_string().red()
    );
    Ok(())
}

/// Cancels `token` when a line arrives on stdin.
///
/// A closed stdin leaves the watcher running.
fn spawn_stdin_stop(token: CancellationToken) {
    thread::spawn(move || {
        let mut line = String::new();
        if matches!(std::io::stdin().lock().read_line(&mut line), Ok(n) if n > 0) {
            token.cancel();
        }
    });
}
