//! Sample ingestion for press-test hardness grading.
//!
//! # Loading
//!
//! - [`load_sample`] - Parse one CSV sample file into a [`Sample`](tactile_types::Sample)
//! - [`read_sample`] - Parse from any reader with an explicit schema
//! - [`list_samples`] - Sample files of a directory, sorted by name
//!
//! # Streaming
//!
//! - [`SampleSource`] - Collaborator that lists and loads arriving samples
//! - [`DirectorySource`] - Directory-watching source
//! - [`Fingerprint`] - Id, size and modification time of one sample version
//!
//! # Layer 1 Crate
//!
//! Depends only on `tactile-types`. Used by training, batch prediction and
//! the streaming predictor.
//!
//! # Quality Standards
//!
//! - Zero clippy/doc warnings
//! - Zero `unwrap`/`expect` in library code

// Safety: Deny unwrap/expect in library code. Tests may use them (workspace warns).
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod error;
mod loader;
mod source;

// Re-export loading utilities
pub use loader::{SAMPLE_EXTENSION, is_sample_file, list_samples, load_sample, read_sample};

// Re-export source types
pub use source::{DirectorySource, Fingerprint, SampleHandle, SampleSource};

// Re-export error types
pub use error::{DatasetError, Result};
