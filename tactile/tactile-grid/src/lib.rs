//! Hardness grid synthesis for tactile press tests.
//!
//! Spreads the 239 per-channel contact values of a sample onto a fixed
//! 9×11 lattice laid over the sensor pad, producing a continuous hardness
//! map for visual inspection.
//!
//! # Lattice
//!
//! - [`Lattice`] - 11 columns across x, 9 rows across y of the geometry extent
//! - [`HardnessGrid`] - `SMatrix<f64, 9, 11>` of continuous scores
//!
//! # Interpolation
//!
//! - [`GridSynthesizer`] - Maps channel values onto the lattice
//! - [`InterpolationMethod`] - Inverse-distance weighting or nearest point
//! - [`InterpolationGap`] - Non-fatal report of a node outside the search radius
//!
//! # Layer 0 Crate
//!
//! This crate depends only on `tactile-types` and has no model or IO
//! dependencies. It can be used in:
//! - Offline grading pipelines
//! - Streaming predictors
//! - Visualization tools
//!
//! # Example
//!
//! ```
//! use nalgebra::Point2;
//! use tactile_grid::{GridConfig, GridSynthesizer, InterpolationMethod};
//! use tactile_types::{ContactGeometry, CONTACT_CHANNELS};
//!
//! let points = (0..CONTACT_CHANNELS)
//!     .map(|i| Point2::new((i % 16) as f64, (i / 16) as f64))
//!     .collect();
//! let geometry = ContactGeometry::from_points(points).unwrap();
//!
//! let config = GridConfig::default().with_method(InterpolationMethod::Nearest);
//! let synth = GridSynthesizer::new(&geometry, config).unwrap();
//!
//! let values: Vec<f64> = (0..CONTACT_CHANNELS).map(|i| i as f64).collect();
//! let result = synth.synthesize(&values).unwrap();
//! assert_eq!(result.grid()[(0, 0)], 0.0);
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
mod interpolation;
mod lattice;
mod synth;

// Re-export lattice types
pub use lattice::{GRID_COLS, GRID_ROWS, HardnessGrid, Lattice};

// Re-export interpolation types
pub use interpolation::{EXACT_HIT_DISTANCE, GridConfig, InterpolationMethod};

// Re-export synthesis types
pub use synth::{GridSynthesis, GridSynthesizer, InterpolationGap};

// Re-export error types
pub use error::{GridError, Result};

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{
        GridConfig, GridError, GridSynthesis, GridSynthesizer, HardnessGrid, InterpolationGap,
        InterpolationMethod, Lattice,
    };
}
