//! CSV sample ingestion.
//!
//! A sample file holds one frame per line in the
//! [`FrameSchema::STANDARD`] layout, without a header. Blank lines are
//! skipped.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use tactile_types::{FrameSchema, Sample, SampleId};
use tracing::debug;

use crate::error::{DatasetError, Result};

/// Extension of sample files.
pub const SAMPLE_EXTENSION: &str = "csv";

/// Loads a sample file; its id is the file stem.
///
/// # Errors
///
/// Returns [`DatasetError::SampleNotFound`] for a missing file and
/// [`DatasetError::MalformedSample`] for a row with too few columns or a
/// file with no data rows.
pub fn load_sample(path: impl AsRef<Path>) -> Result<Sample> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DatasetError::sample_not_found(path.display().to_string()));
    }
    let id = SampleId::from_path(path);
    let file = File::open(path)?;
    let sample = read_sample(id, file, &FrameSchema::STANDARD)?;
    debug!(path = %path.display(), frames = sample.len(), "loaded sample");
    Ok(sample)
}

/// Parses a sample from any reader.
///
/// # Errors
///
/// Same as [`load_sample`], minus the missing-file case.
///
/// # Example
///
/// ```
/// use grading_dataset::read_sample;
/// use tactile_types::{FrameSchema, SampleId};
///
/// let row = vec!["1.0"; 252].join(",");
/// let text = format!("{row}\n\n{row}\n");
///
/// let sample = read_sample(SampleId::new("demo"), text.as_bytes(), &FrameSchema::STANDARD).unwrap();
/// assert_eq!(sample.len(), 2);
/// ```
pub fn read_sample<R: Read>(id: SampleId, reader: R, schema: &FrameSchema) -> Result<Sample> {
    let reader = BufReader::new(reader);
    let mut frames = Vec::new();

    for (row, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        frames.push(schema.parse_row(id.as_str(), row, line)?);
    }

    if frames.is_empty() {
        return Err(DatasetError::malformed(id.as_str(), "no data rows"));
    }
    Ok(Sample::new(id, frames)?)
}

/// Lists the sample files of a directory, sorted by file name.
///
/// # Errors
///
/// Returns [`DatasetError::DirectoryNotFound`] if `dir` is not a directory.
pub fn list_samples(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(DatasetError::directory_not_found(dir.display().to_string()));
    }

    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_sample_file(path))
        .collect();
    paths.sort();
    Ok(paths)
}

/// Returns `true` if the path has the sample extension (any case).
#[must_use]
pub fn is_sample_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SAMPLE_EXTENSION))
}
