//! Press-event samples.

use std::fmt;
use std::path::Path;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, TactileError};
use crate::frame::RawFrame;

/// Stable identifier of a sample, derived from its source.
///
/// # Example
///
/// ```
/// use std::path::Path;
/// use tactile_types::SampleId;
///
/// let id = SampleId::from_path(Path::new("/data/run3/press_042.csv"));
/// assert_eq!(id.as_str(), "press_042");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct SampleId(String);

impl SampleId {
    /// Creates an identifier from any string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derives an identifier from a file path (its stem).
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map_or_else(|| path.display().to_string(), str::to_string);
        Self(stem)
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SampleId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The frames captured during one press event on one specimen.
///
/// A sample is never empty and is not mutated after ingestion; grades and
/// grids are carried by separate result values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Sample {
    id: SampleId,
    frames: Vec<RawFrame>,
}

impl Sample {
    /// Creates a sample from its frames.
    ///
    /// # Errors
    ///
    /// Returns [`TactileError::EmptySample`] if `frames` is empty.
    pub fn new(id: impl Into<SampleId>, frames: Vec<RawFrame>) -> Result<Self> {
        let id = id.into();
        if frames.is_empty() {
            return Err(TactileError::EmptySample(id.to_string()));
        }
        Ok(Self { id, frames })
    }

    /// Returns the sample identifier.
    #[must_use]
    pub const fn id(&self) -> &SampleId {
        &self.id
    }

    /// Returns all frames in capture order.
    #[must_use]
    pub fn frames(&self) -> &[RawFrame] {
        &self.frames
    }

    /// Returns the number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Returns the frames whose values are all finite, in capture order.
    pub fn usable_frames(&self) -> impl Iterator<Item = &RawFrame> {
        self.frames.iter().filter(|f| f.is_usable())
    }

    /// Returns the number of usable frames.
    #[must_use]
    pub fn usable_len(&self) -> usize {
        self.usable_frames().count()
    }
}
