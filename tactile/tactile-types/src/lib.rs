//! Raw press-test data types for tactile hardness grading.
//!
//! This crate provides the foundational types shared by every stage of the
//! grading pipeline:
//! - Feature extraction (frames and samples)
//! - Grid synthesis (contact geometry)
//! - Ingestion (the fixed column schema of a recorded frame)
//!
//! # Layer 0 Crate
//!
//! This is a Layer 0 crate with **no pipeline dependencies**. It can be used in:
//! - CLI tools
//! - Recorder firmware bridges
//! - Offline analysis scripts
//!
//! # Data Types
//!
//! - [`RawFrame`] - One reading: wrench, position, orientation, 239 contacts
//! - [`Sample`] - Ordered frames captured during one press event
//! - [`SampleId`] - Stable identifier derived from the sample's source
//! - [`ContactGeometry`] - Channel index to 2D coordinate table
//! - [`FrameSchema`] - Column layout of a recorded frame row
//!
//! # Example
//!
//! ```
//! use tactile_types::{RawFrame, Sample, CONTACT_CHANNELS};
//!
//! let frame = RawFrame::new(
//!     [0.0, 0.0, -2.0, 0.0, 0.0, 0.1],
//!     [0.0, 0.0, 10.0],
//!     [1.0, 0.0, 0.0, 0.0],
//!     vec![0.0; CONTACT_CHANNELS],
//! )
//! .unwrap();
//!
//! let sample = Sample::new("press_001", vec![frame]).unwrap();
//! assert_eq!(sample.len(), 1);
//! assert!((sample.frames()[0].force_magnitude() - 2.0).abs() < 1e-12);
//! ```
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
mod frame;
mod geometry;
mod sample;
mod schema;

// Re-export core types
pub use error::{Result, TactileError};
pub use frame::{
    CONTACT_CHANNELS, ORIENTATION_CHANNELS, POSITION_CHANNELS, RawFrame, WRENCH_CHANNELS,
    WRENCH_NAMES,
};
pub use geometry::{ContactGeometry, Extent};
pub use sample::{Sample, SampleId};
pub use schema::{FrameSchema, parse_cell};
