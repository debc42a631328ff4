//! The polling watch loop.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use grading_dataset::{Fingerprint, SampleHandle, SampleSource};
use grading_features::FeatureExtractor;
use grading_models::{ModelBundle, ModelStore};
use grading_training::{GradingError, Predictor, RealtimeConfig, SampleFailure, SampleResult};
use tactile_grid::GridSynthesizer;
use tracing::{debug, info, warn};

use crate::cancel::CancellationToken;
use crate::error::{RealtimeError, Result};

/// Lifecycle of a [`RealtimePredictor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RealtimeState {
    /// Started, no scan yet.
    Idle,
    /// Between samples or waiting for the next scan.
    Watching,
    /// Grading one sample.
    Processing,
    /// Cancelled; terminal.
    Stopped,
}

impl fmt::Display for RealtimeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::Watching => "watching",
            Self::Processing => "processing",
            Self::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Emitted once per newly seen sample, after it is fully processed.
#[derive(Debug, Clone, PartialEq)]
pub enum PredictionEvent {
    /// The sample was graded.
    Graded(SampleResult),
    /// The sample could not be loaded or graded; it will not be retried.
    Failed(SampleFailure),
}

impl PredictionEvent {
    /// Returns `true` for a graded sample.
    #[must_use]
    pub const fn is_graded(&self) -> bool {
        matches!(self, Self::Graded(_))
    }
}

/// Counters over the lifetime of a predictor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatchStats {
    /// Completed scan cycles.
    pub cycles: usize,
    /// Samples graded.
    pub graded: usize,
    /// Samples that failed.
    pub failed: usize,
    /// Scans that could not list the source.
    pub scan_errors: usize,
}

/// Grades samples as they appear in a [`SampleSource`].
///
/// Holds a snapshot of the bundle taken at [`start`](Self::start). Each
/// sample version (by [`Fingerprint`]) is processed at most once, whether
/// it succeeds or fails. Only the latest fingerprint per location is kept,
/// so memory is bounded by the number of distinct samples.
///
/// ```text
/// Idle ──► Watching ◄──► Processing
///             │
///             ▼
///          Stopped
/// ```
pub struct RealtimePredictor<S> {
    source: S,
    predictor: Predictor,
    config: RealtimeConfig,
    seen: HashMap<PathBuf, Fingerprint>,
    state: RealtimeState,
    stats: WatchStats,
}

impl<S: fmt::Debug> fmt::Debug for RealtimePredictor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealtimePredictor")
            .field("source", &self.source)
            .field("state", &self.state)
            .field("seen", &self.seen.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl<S: SampleSource> RealtimePredictor<S> {
    /// Snapshots the active bundle and prepares to watch `source`.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::ModelNotLoaded`] if the store is empty, or
    /// an error if the bundle does not match the extractor's layout.
    pub fn start(
        store: &ModelStore,
        source: S,
        extractor: Arc<FeatureExtractor>,
        synthesizer: Arc<GridSynthesizer>,
        config: RealtimeConfig,
    ) -> Result<Self> {
        let bundle = store.current().ok_or(RealtimeError::ModelNotLoaded)?;
        let predictor = Predictor::new(extractor, synthesizer, bundle)?;
        info!(
            k = predictor.bundle().num_grades(),
            poll_ms = config.poll_interval_ms,
            "real-time predictor started"
        );
        Ok(Self {
            source,
            predictor,
            config,
            seen: HashMap::new(),
            state: RealtimeState::Idle,
            stats: WatchStats::default(),
        })
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> RealtimeState {
        self.state
    }

    /// Returns the counters.
    #[must_use]
    pub const fn stats(&self) -> WatchStats {
        self.stats
    }

    /// Returns the bundle snapshot in use.
    #[must_use]
    pub const fn bundle(&self) -> &Arc<ModelBundle> {
        self.predictor.bundle()
    }

    /// Returns the number of distinct sample locations processed.
    #[must_use]
    pub fn processed(&self) -> usize {
        self.seen.len()
    }

    /// Returns the sample source.
    #[must_use]
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Scans once and processes every unseen sample.
    ///
    /// Returns the number of samples processed in this cycle.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::Stopped`] after cancellation, or
    /// [`RealtimeError::Source`] if the source cannot be listed. Errors of
    /// individual samples are reported through `on_event` instead.
    pub fn poll_once<F>(&mut self, on_event: &mut F) -> Result<usize>
    where
        F: FnMut(PredictionEvent),
    {
        if self.state == RealtimeState::Stopped {
            return Err(RealtimeError::Stopped);
        }
        self.transition(RealtimeState::Watching);

        let handles = match self.source.scan() {
            Ok(handles) => handles,
            Err(err) => {
                self.stats.scan_errors += 1;
                return Err(err.into());
            }
        };

        let mut processed = 0;
        for handle in handles {
            if self.seen.get(&handle.location) == Some(&handle.fingerprint) {
                continue;
            }
            self.transition(RealtimeState::Processing);
            let event = self.process(&handle);
            self.seen.insert(handle.location, handle.fingerprint);
            self.transition(RealtimeState::Watching);

            if event.is_graded() {
                self.stats.graded += 1;
            } else {
                self.stats.failed += 1;
            }
            processed += 1;
            on_event(event);
        }

        self.stats.cycles += 1;
        Ok(processed)
    }

    /// Polls until `token` is cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::Stopped`] if the predictor was already
    /// stopped.
    pub fn run<F>(&mut self, token: &CancellationToken, on_event: F) -> Result<WatchStats>
    where
        F: FnMut(PredictionEvent),
    {
        self.run_with_limit(token, None, on_event)
    }

    /// Polls until `token` is cancelled or `max_cycles` scans completed.
    ///
    /// A scan that fails is logged and retried on the next cycle. The
    /// predictor ends in [`RealtimeState::Stopped`] only when cancelled.
    ///
    /// # Errors
    ///
    /// Returns [`RealtimeError::Stopped`] if the predictor was already
    /// stopped.
    pub fn run_with_limit<F>(
        &mut self,
        token: &CancellationToken,
        max_cycles: Option<usize>,
        mut on_event: F,
    ) -> Result<WatchStats>
    where
        F: FnMut(PredictionEvent),
    {
        if self.state == RealtimeState::Stopped {
            return Err(RealtimeError::Stopped);
        }

        let mut cycles = 0;
        loop {
            if token.is_cancelled() {
                self.transition(RealtimeState::Stopped);
                break;
            }

            match self.poll_once(&mut on_event) {
                Ok(0) => {}
                Ok(n) => debug!(processed = n, "cycle complete"),
                Err(err) => warn!(error = %err, "scan failed"),
            }

            cycles += 1;
            if max_cycles.is_some_and(|max| cycles >= max) {
                break;
            }

            if token.wait_timeout(self.config.poll_interval()) {
                self.transition(RealtimeState::Stopped);
                break;
            }
        }

        info!(
            cycles = self.stats.cycles,
            graded = self.stats.graded,
            failed = self.stats.failed,
            state = %self.state,
            "real-time predictor finished"
        );
        Ok(self.stats)
    }

    fn process(&mut self, handle: &SampleHandle) -> PredictionEvent {
        let outcome = self
            .source
            .load(handle)
            .map_err(GradingError::from)
            .and_then(|sample| self.predictor.predict_sample(&sample));

        match outcome {
            Ok(result) => {
                info!(sample = %result.id, grade = result.grade, "sample graded");
                PredictionEvent::Graded(result)
            }
            Err(err) => {
                warn!(sample = %handle.id(), error = %err, "sample failed");
                PredictionEvent::Failed(SampleFailure::new(handle.id().clone(), &err))
            }
        }
    }

    fn transition(&mut self, next: RealtimeState) {
        if self.state != next {
            debug!(from = %self.state, to = %next, "state change");
            self.state = next;
        }
    }
}
