//! Real-time hardness grading of newly arriving samples.
//!
//! A [`RealtimePredictor`] repeatedly scans a
//! [`SampleSource`](grading_dataset::SampleSource), grades every sample
//! version it has not seen before with a snapshot of the trained bundle,
//! and reports each one through a callback. The loop is single-threaded;
//! its only suspension point is the timed wait on a [`CancellationToken`],
//! which a controller on another thread can cut short.
//!
//! # Example
//!
//! ```ignore
//! use grading_dataset::DirectorySource;
//! use grading_realtime::{CancellationToken, PredictionEvent, RealtimePredictor};
//!
//! let mut watcher = RealtimePredictor::start(
//!     &store,
//!     DirectorySource::new("incoming"),
//!     trainer.extractor().clone(),
//!     trainer.synthesizer().clone(),
//!     config.realtime,
//! )?;
//!
//! let token = CancellationToken::new();
//! watcher.run(&token, |event| {
//!     if let PredictionEvent::Graded(result) = event {
//!         println!("{} -> grade {}", result.id, result.grade);
//!     }
//! })?;
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

mod cancel;
mod error;
mod predictor;

pub use cancel::CancellationToken;
pub use predictor::{PredictionEvent, RealtimePredictor, RealtimeState, WatchStats};

// Re-export error types
pub use error::{RealtimeError, Result};
