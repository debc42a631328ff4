//! Model bundle persistence.
//!
//! # Binary Format
//!
//! 1. **Magic bytes**: `HGM1` (4 bytes)
//! 2. **Version**: `u32` little-endian (4 bytes), equal to [`BUNDLE_VERSION`]
//! 3. **Payload**: bincode-encoded [`ModelBundle`]
//!
//! JSON checkpoints hold the same bundle as a pretty-printed object; the
//! version is carried by its `format_version` field.
//!
//! Writes go to a sibling temporary file that is renamed over the target,
//! so a reader never sees a partially written checkpoint.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::bundle::{BUNDLE_VERSION, ModelBundle};
use crate::error::{ModelError, Result};

/// Magic bytes identifying a binary checkpoint.
pub const CHECKPOINT_MAGIC: [u8; 4] = *b"HGM1";

/// Supported checkpoint file formats.
///
/// # Example
///
/// ```
/// use grading_models::CheckpointFormat;
///
/// let format = CheckpointFormat::from_extension("bin");
/// assert_eq!(format, Some(CheckpointFormat::Binary));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum CheckpointFormat {
    /// Binary format - compact and fast.
    Binary,

    /// JSON format - human-readable.
    #[default]
    Json,
}

impl CheckpointFormat {
    /// Determines format from file extension.
    ///
    /// - `.bin`, `.hgm` -> Binary
    /// - `.json` -> Json
    /// - Other -> None
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "bin" | "hgm" => Some(Self::Binary),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Determines format from file path.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Returns the default file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Binary => "bin",
            Self::Json => "json",
        }
    }

    /// Returns the format name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Binary => "binary",
            Self::Json => "json",
        }
    }
}

impl std::fmt::Display for CheckpointFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Writes a bundle in binary format.
///
/// # Errors
///
/// Returns [`ModelError::Serialization`] if encoding fails.
pub fn write_binary<W: Write>(bundle: &ModelBundle, writer: &mut W) -> Result<()> {
    writer.write_all(&CHECKPOINT_MAGIC)?;
    writer.write_all(&BUNDLE_VERSION.to_le_bytes())?;
    bincode::serialize_into(writer, bundle).map_err(|e| ModelError::serialization(e.to_string()))
}

/// Reads and validates a binary bundle.
///
/// # Errors
///
/// Returns [`ModelError::InvalidMagic`], [`ModelError::UnsupportedVersion`],
/// a decoding error, or a validation error.
pub fn read_binary<R: Read>(reader: &mut R) -> Result<ModelBundle> {
    let mut magic = [0u8; 4];
    reader.read_exact(&mut magic)?;
    if magic != CHECKPOINT_MAGIC {
        return Err(ModelError::InvalidMagic(magic));
    }

    let mut version = [0u8; 4];
    reader.read_exact(&mut version)?;
    let version = u32::from_le_bytes(version);
    if version != BUNDLE_VERSION {
        return Err(ModelError::UnsupportedVersion {
            found: version,
            expected: BUNDLE_VERSION,
        });
    }

    let bundle: ModelBundle =
        bincode::deserialize_from(reader).map_err(|e| ModelError::serialization(e.to_string()))?;
    bundle.validate()?;
    Ok(bundle)
}

/// Saves a bundle atomically; the format follows the path's extension.
///
/// # Errors
///
/// Returns [`ModelError::UnsupportedFormat`] for an unknown extension and
/// [`ModelError::SaveCheckpoint`] if writing or renaming fails.
pub fn save_bundle(bundle: &ModelBundle, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = CheckpointFormat::from_path(path)
        .ok_or_else(|| ModelError::unsupported_format(path.display().to_string()))?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| ModelError::save_checkpoint(path.display().to_string(), e.to_string()))?;
    }

    let tmp = temp_path(path);
    let written = write_file(bundle, &tmp, format).and_then(|()| {
        fs::rename(&tmp, path)
            .map_err(|e| ModelError::save_checkpoint(path.display().to_string(), e.to_string()))
    });
    if written.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    written?;

    info!(path = %path.display(), %format, "model saved");
    Ok(())
}

/// Loads and validates a bundle; the format follows the path's extension.
///
/// # Errors
///
/// - [`ModelError::CheckpointNotFound`] if the file doesn't exist
/// - [`ModelError::UnsupportedFormat`] if the format can't be determined
/// - [`ModelError::LoadCheckpoint`] if decoding fails
/// - a validation error for an inconsistent bundle
pub fn load_bundle(path: impl AsRef<Path>) -> Result<ModelBundle> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ModelError::checkpoint_not_found(path.display().to_string()));
    }
    let format = CheckpointFormat::from_path(path)
        .ok_or_else(|| ModelError::unsupported_format(path.display().to_string()))?;

    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let bundle = match format {
        CheckpointFormat::Binary => read_binary(&mut reader),
        CheckpointFormat::Json => serde_json::from_reader::<_, ModelBundle>(reader)
            .map_err(|e| ModelError::serialization(e.to_string()))
            .and_then(|b| b.validate().map(|()| b)),
    }
    .map_err(|e| match e {
        ModelError::Serialization(reason) | ModelError::Io(reason) => {
            ModelError::load_checkpoint(path.display().to_string(), reason)
        }
        other => other,
    })?;

    info!(path = %path.display(), %format, k = bundle.num_grades(), "model loaded");
    Ok(bundle)
}

fn write_file(bundle: &ModelBundle, path: &Path, format: CheckpointFormat) -> Result<()> {
    let save_err = |e: &dyn std::fmt::Display| {
        ModelError::save_checkpoint(path.display().to_string(), e.to_string())
    };

    let file = File::create(path).map_err(|e| save_err(&e))?;
    let mut writer = BufWriter::new(file);
    match format {
        CheckpointFormat::Binary => write_binary(bundle, &mut writer)?,
        CheckpointFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, bundle).map_err(|e| save_err(&e))?;
        }
    }
    let file = writer.into_inner().map_err(|e| save_err(&e))?;
    file.sync_all().map_err(|e| save_err(&e))
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}
