//! Per-sample feature extraction.

use std::sync::Arc;

use tactile_types::{CONTACT_CHANNELS, ContactGeometry, RawFrame, Sample, WRENCH_CHANNELS};
use tracing::debug;

use crate::config::{ChannelReduction, FeatureConfig};
use crate::error::{FeatureError, Result};
use crate::layout::{FEATURE_DIM, FEATURE_NAMES, FeatureVector};
use crate::stats::{
    half_slope, max, mean, min, percentile, population_std, population_variance,
    sign_consistency, trapezoid,
};

/// Displacement below which stiffness is reported as 0.
const MIN_DISPLACEMENT: f64 = 1e-9;

/// Turns a sample into a fixed-length [`FeatureVector`].
///
/// Extraction is deterministic and holds no per-sample state, so one
/// extractor can be shared across threads.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use grading_features::{FEATURE_DIM, FeatureConfig, FeatureExtractor};
/// use nalgebra::Point2;
/// use tactile_types::{CONTACT_CHANNELS, ContactGeometry, RawFrame, Sample};
///
/// let points = (0..CONTACT_CHANNELS)
///     .map(|i| Point2::new((i % 16) as f64, (i / 16) as f64))
///     .collect();
/// let geometry = Arc::new(ContactGeometry::from_points(points).unwrap());
/// let extractor = FeatureExtractor::new(FeatureConfig::default(), geometry).unwrap();
///
/// let frames = (0..8)
///     .map(|i| {
///         RawFrame::new(
///             [0.0, 0.0, -f64::from(i), 0.0, 0.0, 0.0],
///             [0.0, 0.0, 10.0 - 0.1 * f64::from(i)],
///             [1.0, 0.0, 0.0, 0.0],
///             vec![f64::from(i); CONTACT_CHANNELS],
///         )
///         .unwrap()
///     })
///     .collect();
/// let sample = Sample::new("press_001", frames).unwrap();
///
/// let features = extractor.extract(&sample).unwrap();
/// assert_eq!(features.len(), FEATURE_DIM);
/// ```
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: FeatureConfig,
    geometry: Arc<ContactGeometry>,
}

impl FeatureExtractor {
    /// Creates an extractor.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: FeatureConfig, geometry: Arc<ContactGeometry>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, geometry })
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Returns the contact geometry.
    #[must_use]
    pub fn geometry(&self) -> &ContactGeometry {
        &self.geometry
    }

    /// Extracts the feature vector of a sample.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::InsufficientData`] if fewer than
    /// `min_frames` frames are usable, or
    /// [`FeatureError::NonFiniteFeature`] if finite readings still overflow
    /// a feature.
    pub fn extract(&self, sample: &Sample) -> Result<FeatureVector> {
        let frames = self.usable_frames(sample)?;
        let mut values = Vec::with_capacity(FEATURE_DIM);

        // Mechanical statistics per wrench channel
        for axis in 0..WRENCH_CHANNELS {
            let series: Vec<f64> = frames.iter().map(|f| f.wrench()[axis]).collect();
            values.push(mean(&series));
            values.push(population_std(&series));
            values.push(min(&series));
            values.push(max(&series));
            values.push(half_slope(&series));
        }

        // Load ramp
        let load: Vec<f64> = frames.iter().map(|f| f.force_magnitude()).collect();
        values.push(half_slope(&load));
        values.push(max(&load));

        // Press mechanics
        values.push(self.stiffness(&frames));
        values.push(work_done(&frames));

        // Torque
        let torque: Vec<f64> = frames.iter().map(|f| f.torque_magnitude()).collect();
        values.push(half_slope(&torque));
        values.push(mean(&torque));
        for axis in 0..3 {
            let series: Vec<f64> = frames.iter().map(|f| f.torque()[axis]).collect();
            values.push(sign_consistency(&series));
        }

        // Contact distribution
        let channel_means = channel_means(&frames);
        let all_contacts: Vec<f64> = frames
            .iter()
            .flat_map(|f| f.contacts().iter().copied())
            .collect();
        values.push(mean(&all_contacts));
        values.push(population_variance(&all_contacts));
        values.push(percentile(&channel_means, 0.9));

        let active: Vec<usize> = channel_means
            .iter()
            .enumerate()
            .filter(|(_, m)| **m >= self.config.activation_threshold)
            .map(|(i, _)| i)
            .collect();
        #[allow(clippy::cast_precision_loss)]
        values.push(active.len() as f64 / CONTACT_CHANNELS as f64);

        let (cx, cy) = self.centroid(&active);
        values.push(cx);
        values.push(cy);

        debug_assert_eq!(values.len(), FEATURE_DIM);
        if let Some((_, name)) = values
            .iter()
            .zip(FEATURE_NAMES)
            .find(|(v, _)| !v.is_finite())
        {
            debug!(sample = %sample.id(), feature = name, "feature overflowed");
            return Err(FeatureError::non_finite(sample.id().as_str(), name));
        }
        Ok(FeatureVector::new(values))
    }

    /// Reduces a sample to one value per contact channel, in channel order.
    ///
    /// # Errors
    ///
    /// Returns [`FeatureError::InsufficientData`] under the same rule as
    /// [`extract`](Self::extract).
    pub fn channel_profile(&self, sample: &Sample) -> Result<Vec<f64>> {
        let frames = self.usable_frames(sample)?;
        match self.config.channel_reduction {
            ChannelReduction::Mean => Ok(channel_means(&frames)),
            ChannelReduction::PeakLoad => {
                let mut peak = frames[0];
                for frame in &frames[1..] {
                    if frame.force_magnitude() > peak.force_magnitude() {
                        peak = frame;
                    }
                }
                Ok(peak.contacts().to_vec())
            }
        }
    }

    fn usable_frames<'a>(&self, sample: &'a Sample) -> Result<Vec<&'a RawFrame>> {
        let frames: Vec<&RawFrame> = sample.usable_frames().collect();
        let dropped = sample.len() - frames.len();
        if dropped > 0 {
            debug!(sample = %sample.id(), dropped, "dropped non-finite frames");
        }
        if frames.len() < self.config.min_frames {
            return Err(FeatureError::insufficient_data(
                sample.id().as_str(),
                frames.len(),
                self.config.min_frames,
            ));
        }
        Ok(frames)
    }

    /// `|ΔFz / Δz|` from press start to the most negative Fz.
    fn stiffness(&self, frames: &[&RawFrame]) -> f64 {
        let mut peak = 0;
        for (i, frame) in frames.iter().enumerate() {
            if frame.force_z() < frames[peak].force_z() {
                peak = i;
            }
        }

        let start = frames[..=peak]
            .iter()
            .position(|f| f.force_z() < self.config.press_start_force)
            .unwrap_or(0);

        let delta_z = frames[peak].position_z() - frames[start].position_z();
        if delta_z.abs() < MIN_DISPLACEMENT {
            return 0.0;
        }
        ((frames[peak].force_z() - frames[start].force_z()) / delta_z).abs()
    }

    fn centroid(&self, active: &[usize]) -> (f64, f64) {
        let points: Vec<_> = active
            .iter()
            .filter_map(|&i| self.geometry.point(i))
            .collect();
        if points.is_empty() {
            let center = self.geometry.extent().center();
            return (center.x, center.y);
        }
        let xs: Vec<f64> = points.iter().map(|p| p.x).collect();
        let ys: Vec<f64> = points.iter().map(|p| p.y).collect();
        (mean(&xs), mean(&ys))
    }
}

/// Absolute trapezoidal integral of `|Fz|` over indenter travel.
fn work_done(frames: &[&RawFrame]) -> f64 {
    let force: Vec<f64> = frames.iter().map(|f| f.force_z().abs()).collect();
    let travel: Vec<f64> = frames.iter().map(|f| f.position_z()).collect();
    trapezoid(&force, &travel).abs()
}

#[allow(clippy::cast_precision_loss)]
fn channel_means(frames: &[&RawFrame]) -> Vec<f64> {
    let mut sums = vec![0.0; CONTACT_CHANNELS];
    for frame in frames {
        for (sum, v) in sums.iter_mut().zip(frame.contacts()) {
            *sum += v;
        }
    }
    let n = frames.len().max(1) as f64;
    sums.into_iter().map(|s| s / n).collect()
}

#[cfg(test)]
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
mod tests {
    use approx::assert_relative_eq;
    use nalgebra::Point2;
    use proptest::prelude::*;

    use super::*;
    use crate::layout::feature_index;

    fn geometry() -> Arc<ContactGeometry> {
        let points = (0..CONTACT_CHANNELS)
            .map(|i| Point2::new((i % 16) as f64, (i / 16) as f64))
            .collect();
        Arc::new(ContactGeometry::from_points(points).unwrap())
    }

    fn extractor(config: FeatureConfig) -> FeatureExtractor {
        FeatureExtractor::new(config, geometry()).unwrap()
    }

    fn frame(wrench: [f64; 6], z: f64, contacts: Vec<f64>) -> RawFrame {
        RawFrame::new(wrench, [0.0, 0.0, z], [1.0, 0.0, 0.0, 0.0], contacts).unwrap()
    }

    /// Vertical press: Fz falls to -4 while z descends, then partly recovers.
    fn press_sample() -> Sample {
        let fz = [0.0, -1.0, -2.0, -3.0, -4.0, -2.0];
        let z = [10.0, 9.9, 9.8, 9.7, 9.6, 9.7];
        let frames = fz
            .iter()
            .zip(z)
            .map(|(&fz, z)| frame([0.0, 0.0, fz, 0.1, -0.2, 0.0], z, vec![0.0; CONTACT_CHANNELS]))
            .collect();
        Sample::new("press", frames).unwrap()
    }

    fn value(features: &FeatureVector, name: &str) -> f64 {
        features.values()[feature_index(name).unwrap()]
    }

    #[test]
    fn extract_dimension() {
        let features = extractor(FeatureConfig::default())
            .extract(&press_sample())
            .unwrap();
        assert_eq!(features.len(), FEATURE_DIM);
        assert!(features.values().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn extract_wrench_statistics() {
        let features = extractor(FeatureConfig::default())
            .extract(&press_sample())
            .unwrap();
        assert_relative_eq!(value(&features, "fz_mean"), -2.0);
        assert_relative_eq!(value(&features, "fz_min"), -4.0);
        assert_relative_eq!(value(&features, "fz_max"), 0.0);
        // [0, -1, -2] vs [-3, -4, -2]
        assert_relative_eq!(value(&features, "fz_slope"), -2.0);
        assert_relative_eq!(value(&features, "fx_std"), 0.0);
        assert_relative_eq!(value(&features, "peak_load"), 4.0);
    }

    #[test]
    fn extract_stiffness_and_work() {
        let features = extractor(FeatureConfig::default())
            .extract(&press_sample())
            .unwrap();
        // Start at frame 1 (Fz = -1, z = 9.9), peak at frame 4 (Fz = -4, z = 9.6).
        assert_relative_eq!(value(&features, "stiffness"), 10.0, epsilon = 1e-6);
        assert_relative_eq!(value(&features, "work_done"), 0.5, epsilon = 1e-9);
    }

    #[test]
    fn stiffness_zero_without_displacement() {
        let frames = (0..5)
            .map(|i| frame([0.0, 0.0, -f64::from(i), 0.0, 0.0, 0.0], 5.0, vec![0.0; CONTACT_CHANNELS]))
            .collect();
        let sample = Sample::new("flat", frames).unwrap();
        let features = extractor(FeatureConfig::default()).extract(&sample).unwrap();
        assert_eq!(value(&features, "stiffness"), 0.0);
    }

    #[test]
    fn extract_torque_sign_consistency() {
        let features = extractor(FeatureConfig::default())
            .extract(&press_sample())
            .unwrap();
        assert_relative_eq!(value(&features, "tx_sign_consistency"), 1.0);
        assert_relative_eq!(value(&features, "ty_sign_consistency"), 1.0);
        assert_relative_eq!(value(&features, "tz_sign_consistency"), 0.0);
        assert_relative_eq!(value(&features, "torque_trend"), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn extract_contact_area_and_centroid() {
        let mut contacts = vec![0.0; CONTACT_CHANNELS];
        // Channels 0 and 2 sit at (0, 0) and (2, 0).
        contacts[0] = 20.0;
        contacts[2] = 40.0;
        let frames = (0..5)
            .map(|_| frame([0.0; 6], 0.0, contacts.clone()))
            .collect();
        let sample = Sample::new("contact", frames).unwrap();

        let features = extractor(FeatureConfig::default()).extract(&sample).unwrap();
        assert_relative_eq!(value(&features, "contact_area"), 2.0 / 239.0);
        assert_relative_eq!(value(&features, "contact_centroid_x"), 1.0);
        assert_relative_eq!(value(&features, "contact_centroid_y"), 0.0);
        assert_relative_eq!(value(&features, "contact_mean"), 60.0 / 239.0, epsilon = 1e-12);
    }

    #[test]
    fn centroid_falls_back_to_geometry_center() {
        let features = extractor(FeatureConfig::default())
            .extract(&press_sample())
            .unwrap();
        let center = geometry().extent().center();
        assert_relative_eq!(value(&features, "contact_area"), 0.0);
        assert_relative_eq!(value(&features, "contact_centroid_x"), center.x);
        assert_relative_eq!(value(&features, "contact_centroid_y"), center.y);
    }

    #[test]
    fn min_frames_boundary() {
        let extractor = extractor(FeatureConfig::default());
        let make = |n: usize| {
            let frames = (0..n)
                .map(|_| frame([0.0; 6], 0.0, vec![1.0; CONTACT_CHANNELS]))
                .collect();
            Sample::new("s", frames).unwrap()
        };

        assert!(extractor.extract(&make(5)).is_ok());
        match extractor.extract(&make(4)) {
            Err(FeatureError::InsufficientData {
                usable, required, ..
            }) => {
                assert_eq!(usable, 4);
                assert_eq!(required, 5);
            }
            other => panic!("expected insufficient data, got {other:?}"),
        }
    }

    #[test]
    fn non_finite_frames_are_dropped() {
        let mut frames: Vec<RawFrame> = (0..5)
            .map(|_| frame([1.0; 6], 0.0, vec![1.0; CONTACT_CHANNELS]))
            .collect();
        frames.push(frame([f64::NAN; 6], 0.0, vec![1.0; CONTACT_CHANNELS]));
        let sample = Sample::new("nan", frames).unwrap();

        let features = extractor(FeatureConfig::default()).extract(&sample).unwrap();
        assert_relative_eq!(value(&features, "fx_mean"), 1.0);

        let strict = extractor(FeatureConfig::default().with_min_frames(6));
        assert!(strict.extract(&sample).is_err());
    }

    #[test]
    fn overflowing_readings_are_rejected() {
        // Every reading is finite; their squared spread is not.
        let contacts: Vec<f64> = (0..CONTACT_CHANNELS)
            .map(|i| if i % 2 == 0 { 1e200 } else { -1e200 })
            .collect();
        let frames = (0..6)
            .map(|_| frame([0.0, 0.0, -1.0, 0.0, 0.0, 0.0], 0.0, contacts.clone()))
            .collect();
        let sample = Sample::new("spike", frames).unwrap();

        let err = extractor(FeatureConfig::default())
            .extract(&sample)
            .unwrap_err();
        match err {
            FeatureError::NonFiniteFeature { sample, feature } => {
                assert_eq!(sample, "spike");
                assert_eq!(feature, "contact_variance");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn channel_profile_mean_and_peak() {
        let frames = (0..5)
            .map(|i| {
                let fz = -f64::from(i);
                frame([0.0, 0.0, fz, 0.0, 0.0, 0.0], 0.0, vec![f64::from(i); CONTACT_CHANNELS])
            })
            .collect();
        let sample = Sample::new("profile", frames).unwrap();

        let mean = extractor(FeatureConfig::default())
            .channel_profile(&sample)
            .unwrap();
        assert_eq!(mean.len(), CONTACT_CHANNELS);
        assert_relative_eq!(mean[0], 2.0);

        let peak = extractor(
            FeatureConfig::default().with_channel_reduction(ChannelReduction::PeakLoad),
        )
        .channel_profile(&sample)
        .unwrap();
        assert_relative_eq!(peak[100], 4.0);
    }

    proptest! {
        #[test]
        fn extraction_is_deterministic(fz in prop::collection::vec(-50.0f64..0.0, 5..40)) {
            let frames = fz
                .iter()
                .enumerate()
                .map(|(i, &f)| frame([0.1, 0.2, f, 0.0, 0.0, 0.01], 10.0 - i as f64 * 0.05, vec![f.abs(); CONTACT_CHANNELS]))
                .collect();
            let sample = Sample::new("p", frames).unwrap();
            let extractor = extractor(FeatureConfig::default());
            let a = extractor.extract(&sample).unwrap();
            let b = extractor.extract(&sample).unwrap();
            prop_assert_eq!(a.len(), FEATURE_DIM);
            prop_assert_eq!(a, b);
        }
    }
}
