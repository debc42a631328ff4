//! Shared setup: configuration, geometry, trainer and model.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use grading_models::{ModelBundle, ModelStore};
use grading_training::{GradingConfig, Trainer};
use owo_colors::OwoColorize;
use tactile_types::ContactGeometry;
use tracing::debug;

/// Loads `path` if given, otherwise the defaults.
pub fn load_config(path: Option<&Path>) -> Result<GradingConfig> {
    match path {
        Some(path) => GradingConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(GradingConfig::default()),
    }
}

/// Loads the contact geometry and builds a trainer around it.
pub fn trainer(config: GradingConfig) -> Result<Trainer> {
    let geometry_file = config.paths.geometry_file.clone();
    let geometry = ContactGeometry::load(&geometry_file)
        .with_context(|| format!("Failed to load geometry {}", geometry_file.display()))?;
    debug!(channels = geometry.len(), "geometry loaded");
    Trainer::new(config, Arc::new(geometry)).context("Invalid configuration")
}

/// Loads a persisted model into a fresh store.
///
/// Falls back to the configured model file when `model` is `None`.
pub fn load_model(
    config: &GradingConfig,
    model: Option<PathBuf>,
) -> Result<(ModelStore, Arc<ModelBundle>)> {
    let path = model.unwrap_or_else(|| config.paths.model_file.clone());
    let store = ModelStore::new();
    let bundle = store.load_file(&path).with_context(|| {
        format!(
            "Failed to load model {} (run `hardness train` first)",
            path.display()
        )
    })?;
    Ok((store, bundle))
}

/// Prints the configuration as JSON, or writes it to `write`.
pub fn show_config(config: &GradingConfig, write: Option<&Path>) -> Result<()> {
    match write {
        Some(path) => {
            config
                .save(path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("{} wrote {}", "✓".green(), path.display());
        }
        None => println!("{}", serde_json::to_string_pretty(config)?),
    }
    Ok(())
}
