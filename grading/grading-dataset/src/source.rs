//! Sample-arrival sources for streaming prediction.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;

use tactile_types::{Sample, SampleId};
use tracing::debug;

use crate::error::{DatasetError, Result};
use crate::loader::{is_sample_file, load_sample};

/// Identity of one version of a sample: id, size and modification time.
///
/// A rewritten file gets a new fingerprint and is treated as a new sample.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint {
    /// Sample identifier.
    pub id: SampleId,
    /// Size in bytes.
    pub size: u64,
    /// Modification time in nanoseconds since the Unix epoch (0 if unknown).
    pub modified_ns: u128,
}

impl Fingerprint {
    /// Creates a fingerprint.
    #[must_use]
    pub const fn new(id: SampleId, size: u64, modified_ns: u128) -> Self {
        Self {
            id,
            size,
            modified_ns,
        }
    }
}

/// A discovered, not yet loaded sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleHandle {
    /// Where the sample lives.
    pub location: PathBuf,
    /// Identity of this version of the sample.
    pub fingerprint: Fingerprint,
}

impl SampleHandle {
    /// Returns the sample identifier.
    #[must_use]
    pub const fn id(&self) -> &SampleId {
        &self.fingerprint.id
    }
}

/// Supplies newly arriving samples.
///
/// `scan` lists every sample currently available, oldest first; callers
/// deduplicate by [`Fingerprint`].
pub trait SampleSource {
    /// Lists the available samples.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be listed.
    fn scan(&mut self) -> Result<Vec<SampleHandle>>;

    /// Loads one listed sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the sample is gone or malformed.
    fn load(&mut self, handle: &SampleHandle) -> Result<Sample>;
}

/// Watches a directory of CSV sample files.
///
/// # Example
///
/// ```
/// use grading_dataset::{DirectorySource, SampleSource};
///
/// let dir = tempfile::tempdir().unwrap();
/// std::fs::write(dir.path().join("press_1.csv"), vec!["0"; 252].join(",")).unwrap();
///
/// let mut source = DirectorySource::new(dir.path());
/// let handles = source.scan().unwrap();
/// assert_eq!(handles.len(), 1);
/// assert_eq!(handles[0].id().as_str(), "press_1");
/// ```
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
}

impl DirectorySource {
    /// Creates a source over a directory.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the watched directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SampleSource for DirectorySource {
    fn scan(&mut self) -> Result<Vec<SampleHandle>> {
        if !self.dir.is_dir() {
            return Err(DatasetError::directory_not_found(self.dir.display().to_string()));
        }

        let mut handles = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            if !is_sample_file(&path) {
                continue;
            }
            // Files can vanish between listing and stat
            let Ok(meta) = entry.metadata() else { continue };
            if !meta.is_file() {
                continue;
            }
            let modified_ns = meta
                .modified()
                .ok()
                .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
                .map_or(0, |d| d.as_nanos());
            handles.push(SampleHandle {
                fingerprint: Fingerprint::new(SampleId::from_path(&path), meta.len(), modified_ns),
                location: path,
            });
        }

        handles.sort_by(|a, b| {
            a.fingerprint
                .modified_ns
                .cmp(&b.fingerprint.modified_ns)
                .then_with(|| a.location.cmp(&b.location))
        });
        debug!(dir = %self.dir.display(), found = handles.len(), "scanned sample directory");
        Ok(handles)
    }

    fn load(&mut self, handle: &SampleHandle) -> Result<Sample> {
        load_sample(&handle.location)
    }
}
