//! Watch-loop behavior against an in-memory sample source: deduplication,
//! failure isolation, cancellation and bundle snapshots.

#![allow(clippy::unwrap_used, clippy::cast_precision_loss)]

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use grading_dataset::{DatasetError, DirectorySource, Fingerprint, SampleHandle, SampleSource};
use grading_models::ModelStore;
use grading_realtime::{
    CancellationToken, PredictionEvent, RealtimeError, RealtimePredictor, RealtimeState,
};
use grading_training::{FailureKind, GradingConfig, RealtimeConfig, Trainer};
use nalgebra::Point2;
use tactile_types::{CONTACT_CHANNELS, ContactGeometry, RawFrame, Sample, SampleId};

fn press(id: &str, peak: f64, intensity: f64) -> Sample {
    let frames = (0..20)
        .map(|t| {
            let progress = f64::from(t) / 19.0;
            RawFrame::new(
                [0.1 * progress, 0.0, -peak * progress, 0.0, 0.0, 0.0],
                [0.0, 0.0, 10.0 - 0.5 * progress],
                [1.0, 0.0, 0.0, 0.0],
                vec![intensity * progress; CONTACT_CHANNELS],
            )
            .unwrap()
        })
        .collect();
    Sample::new(id, frames).unwrap()
}

struct Setup {
    _dir: tempfile::TempDir,
    trainer: Trainer,
    store: ModelStore,
}

fn setup() -> Setup {
    let dir = tempfile::tempdir().unwrap();
    let points = (0..CONTACT_CHANNELS)
        .map(|i| Point2::new((i % 16) as f64, (i / 16) as f64))
        .collect();
    let geometry = Arc::new(ContactGeometry::from_points(points).unwrap());
    let config = GradingConfig::default()
        .with_num_grades(2)
        .with_model_file(dir.path().join("model.bin"));
    let trainer = Trainer::new(config, geometry).unwrap();

    let store = ModelStore::new();
    let corpus = vec![
        press("soft_a", 10.0, 5.0),
        press("soft_b", 10.4, 5.1),
        press("soft_c", 9.8, 4.9),
        press("hard_a", 100.0, 50.0),
        press("hard_b", 102.0, 51.0),
        press("hard_c", 98.0, 49.0),
    ];
    trainer.train_samples(corpus, &store).unwrap();

    Setup {
        _dir: dir,
        trainer,
        store,
    }
}

struct Entry {
    handle: SampleHandle,
    sample: Option<Sample>,
}

/// Shared in-memory source; clones see the same entries.
#[derive(Clone, Default)]
struct MemorySource {
    entries: Arc<Mutex<Vec<Entry>>>,
    loads: Arc<AtomicUsize>,
    offline: Arc<AtomicBool>,
}

impl MemorySource {
    /// Adds a sample, replacing any earlier version at the same location.
    fn push(&self, sample: Option<Sample>, id: &str, size: u64) {
        let fingerprint = Fingerprint::new(SampleId::new(id), size, 1);
        let location: PathBuf = format!("mem://{id}").into();
        let mut entries = self.entries.lock().unwrap();
        entries.retain(|e| e.handle.location != location);
        entries.push(Entry {
            handle: SampleHandle {
                location,
                fingerprint,
            },
            sample,
        });
    }

    fn add(&self, sample: Sample, size: u64) {
        let id = sample.id().as_str().to_string();
        self.push(Some(sample), &id, size);
    }
}

impl SampleSource for MemorySource {
    fn scan(&mut self) -> grading_dataset::Result<Vec<SampleHandle>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(DatasetError::directory_not_found("mem://"));
        }
        Ok(self
            .entries
            .lock()
            .unwrap()
            .iter()
            .map(|e| e.handle.clone())
            .collect())
    }

    fn load(&mut self, handle: &SampleHandle) -> grading_dataset::Result<Sample> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let entries = self.entries.lock().unwrap();
        let entry = entries
            .iter()
            .find(|e| e.handle.fingerprint == handle.fingerprint)
            .ok_or_else(|| DatasetError::sample_not_found(handle.id().as_str()))?;
        entry
            .sample
            .clone()
            .ok_or_else(|| DatasetError::malformed(handle.id().as_str(), "truncated upload"))
    }
}

fn watcher(
    setup: &Setup,
    source: MemorySource,
    poll_interval_ms: u64,
) -> RealtimePredictor<MemorySource> {
    RealtimePredictor::start(
        &setup.store,
        source,
        Arc::clone(setup.trainer.extractor()),
        Arc::clone(setup.trainer.synthesizer()),
        RealtimeConfig { poll_interval_ms },
    )
    .unwrap()
}

#[test]
fn start_requires_a_model() {
    let setup = setup();
    let empty = ModelStore::new();
    let result = RealtimePredictor::start(
        &empty,
        MemorySource::default(),
        Arc::clone(setup.trainer.extractor()),
        Arc::clone(setup.trainer.synthesizer()),
        RealtimeConfig::default(),
    );
    assert!(matches!(result, Err(RealtimeError::ModelNotLoaded)));
}

#[test]
fn each_sample_version_is_processed_once() {
    let setup = setup();
    let source = MemorySource::default();
    source.add(press("new_soft", 10.1, 5.0), 100);
    source.add(press("new_hard", 99.0, 50.0), 100);

    let mut watcher = watcher(&setup, source.clone(), 1000);
    assert_eq!(watcher.state(), RealtimeState::Idle);

    let mut events = Vec::new();
    assert_eq!(watcher.poll_once(&mut |e| events.push(e)).unwrap(), 2);
    assert_eq!(watcher.state(), RealtimeState::Watching);

    let grades: Vec<(String, usize)> = events
        .iter()
        .map(|e| match e {
            PredictionEvent::Graded(r) => (r.id.to_string(), r.grade),
            PredictionEvent::Failed(f) => panic!("unexpected failure: {}", f.reason),
        })
        .collect();
    assert_eq!(
        grades,
        vec![("new_soft".to_string(), 1), ("new_hard".to_string(), 2)]
    );

    // Nothing new
    assert_eq!(watcher.poll_once(&mut |e| events.push(e)).unwrap(), 0);
    assert_eq!(source.loads.load(Ordering::SeqCst), 2);

    // Same id, new size: a rewritten file is a new version
    source.add(press("new_soft", 10.3, 5.2), 120);
    assert_eq!(watcher.poll_once(&mut |e| events.push(e)).unwrap(), 1);
    assert_eq!(watcher.processed(), 2);
    assert_eq!(watcher.stats().graded, 3);
    assert_eq!(watcher.stats().cycles, 3);
}

#[test]
fn rewrites_do_not_grow_the_seen_set() {
    let setup = setup();
    let source = MemorySource::default();
    let mut watcher = watcher(&setup, source.clone(), 1000);
    let mut events = Vec::new();

    for version in 1..=5u64 {
        source.add(press("bench", 10.0, 5.0), 100 + version);
        assert_eq!(watcher.poll_once(&mut |e| events.push(e)).unwrap(), 1);
        assert_eq!(watcher.poll_once(&mut |e| events.push(e)).unwrap(), 0);
        assert_eq!(watcher.processed(), 1);
    }

    assert_eq!(events.len(), 5);
    assert_eq!(watcher.stats().graded, 5);
    assert_eq!(source.loads.load(Ordering::SeqCst), 5);
}

#[test]
fn failed_samples_are_reported_and_not_retried() {
    let setup = setup();
    let source = MemorySource::default();
    source.push(None, "corrupt", 10);
    source.add(press("thin", 50.0, 20.0), 40);
    let short = Sample::new("short", press("x", 10.0, 5.0).frames()[..3].to_vec()).unwrap();
    source.add(short, 5);

    let mut watcher = watcher(&setup, source.clone(), 1000);
    let mut events = Vec::new();
    watcher.poll_once(&mut |e| events.push(e)).unwrap();
    watcher.poll_once(&mut |e| events.push(e)).unwrap();

    assert_eq!(events.len(), 3);
    let kinds: Vec<Option<FailureKind>> = events
        .iter()
        .map(|e| match e {
            PredictionEvent::Graded(_) => None,
            PredictionEvent::Failed(f) => Some(f.kind),
        })
        .collect();
    assert_eq!(
        kinds,
        vec![
            Some(FailureKind::MalformedSample),
            None,
            Some(FailureKind::InsufficientData)
        ]
    );
    assert_eq!(watcher.stats().failed, 2);
    assert_eq!(watcher.stats().graded, 1);
    assert_eq!(source.loads.load(Ordering::SeqCst), 3);
}

#[test]
fn scan_errors_do_not_stop_the_loop() {
    let setup = setup();
    let source = MemorySource::default();
    source.offline.store(true, Ordering::SeqCst);
    let mut watcher = watcher(&setup, source.clone(), 1);

    let err = watcher.poll_once(&mut |_| {}).unwrap_err();
    assert!(matches!(err, RealtimeError::Source(_)));

    let token = CancellationToken::new();
    let stats = watcher.run_with_limit(&token, Some(3), |_| {}).unwrap();
    assert_eq!(stats.scan_errors, 4);
    assert_eq!(stats.cycles, 0);

    source.offline.store(false, Ordering::SeqCst);
    source.add(press("late", 100.0, 50.0), 1);
    let mut graded = 0;
    watcher
        .run_with_limit(&token, Some(1), |e| graded += usize::from(e.is_graded()))
        .unwrap();
    assert_eq!(graded, 1);
}

#[test]
fn cancellation_stops_a_waiting_loop() {
    let setup = setup();
    let source = MemorySource::default();
    source.add(press("first", 10.0, 5.0), 1);
    let mut watcher = watcher(&setup, source, 60_000);

    let token = CancellationToken::new();
    let remote = token.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        remote.cancel();
    });

    let start = Instant::now();
    let mut events = 0;
    let stats = watcher.run(&token, |_| events += 1).unwrap();
    canceller.join().unwrap();

    assert!(start.elapsed() < Duration::from_secs(30));
    assert_eq!(events, 1);
    assert_eq!(stats.cycles, 1);
    assert_eq!(watcher.state(), RealtimeState::Stopped);

    assert!(matches!(
        watcher.poll_once(&mut |_| {}),
        Err(RealtimeError::Stopped)
    ));
    assert!(matches!(
        watcher.run(&token, |_| {}),
        Err(RealtimeError::Stopped)
    ));
}

#[test]
fn cancelled_before_start_runs_no_cycle() {
    let setup = setup();
    let source = MemorySource::default();
    source.add(press("never", 10.0, 5.0), 1);
    let mut watcher = watcher(&setup, source.clone(), 1000);

    let token = CancellationToken::new();
    token.cancel();
    let stats = watcher.run(&token, |_| {}).unwrap();

    assert_eq!(stats.cycles, 0);
    assert_eq!(source.loads.load(Ordering::SeqCst), 0);
    assert_eq!(watcher.state(), RealtimeState::Stopped);
}

#[test]
fn watcher_keeps_its_bundle_snapshot() {
    let setup = setup();
    let watcher = watcher(&setup, MemorySource::default(), 1000);
    let snapshot = Arc::clone(watcher.bundle());

    let mut retrained = (*snapshot).clone();
    retrained.created_at += 1.0;
    setup.store.publish(retrained);

    assert!(Arc::ptr_eq(watcher.bundle(), &snapshot));
    assert!(!Arc::ptr_eq(&setup.store.current().unwrap(), &snapshot));
}

#[test]
fn directory_source_end_to_end() {
    let setup = setup();
    let dir = tempfile::tempdir().unwrap();
    let row = |fz: f64| {
        let mut cells = vec![0.0; 252];
        cells[2] = fz;
        cells[8] = 10.0 + fz / 200.0;
        for c in &mut cells[13..] {
            *c = -fz / 2.0;
        }
        cells
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",")
    };
    let text: String = (0..20)
        .map(|t| row(-100.0 * f64::from(t) / 19.0) + "\n")
        .collect();
    std::fs::write(dir.path().join("incoming_1.csv"), text).unwrap();

    let mut watcher = RealtimePredictor::start(
        &setup.store,
        DirectorySource::new(dir.path()),
        Arc::clone(setup.trainer.extractor()),
        Arc::clone(setup.trainer.synthesizer()),
        RealtimeConfig::default(),
    )
    .unwrap();

    let mut events = Vec::new();
    assert_eq!(watcher.poll_once(&mut |e| events.push(e)).unwrap(), 1);
    assert!(events[0].is_graded());
    assert_eq!(watcher.poll_once(&mut |e| events.push(e)).unwrap(), 0);
}
