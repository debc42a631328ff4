//! Grid synthesis from per-channel contact values.

use std::fmt;

use nalgebra::{Point2, distance};
use serde::{Deserialize, Serialize};
use tactile_types::ContactGeometry;
use tracing::debug;

use crate::error::{GridError, Result};
use crate::interpolation::{EXACT_HIT_DISTANCE, GridConfig, InterpolationMethod, idw_weight};
use crate::lattice::{GRID_COLS, GRID_ROWS, HardnessGrid, Lattice};

/// A lattice node that had no contact point within the search radius.
///
/// The node still receives a value (that of its nearest point); the gap is
/// reported so callers can flag sparse coverage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InterpolationGap {
    /// Lattice row.
    pub row: usize,
    /// Lattice column.
    pub col: usize,
    /// Channel whose value was used.
    pub nearest_channel: usize,
    /// Distance from the node to that channel.
    pub distance: f64,
}

impl fmt::Display for InterpolationGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "node ({}, {}) has no contact within radius, nearest channel {} at {:.3}",
            self.row, self.col, self.nearest_channel, self.distance
        )
    }
}

/// Output of one synthesis: the grid and any coverage gaps.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSynthesis {
    grid: HardnessGrid,
    gaps: Vec<InterpolationGap>,
}

impl GridSynthesis {
    /// Returns the continuous hardness grid.
    #[must_use]
    pub const fn grid(&self) -> &HardnessGrid {
        &self.grid
    }

    /// Returns the nodes that fell back to their nearest point.
    #[must_use]
    pub fn gaps(&self) -> &[InterpolationGap] {
        &self.gaps
    }

    /// Returns `true` if any node fell back to its nearest point.
    #[must_use]
    pub fn has_gaps(&self) -> bool {
        !self.gaps.is_empty()
    }

    /// Consumes the synthesis, returning the grid.
    #[must_use]
    pub fn into_grid(self) -> HardnessGrid {
        self.grid
    }

    /// Rescales the grid into the band of a grade.
    ///
    /// Grade `g` of `k` occupies `[(g - 1) / k, g / k] * 100`. The grid's
    /// minimum maps to the bottom of the band and its maximum to the top; a
    /// flat grid maps to the band midpoint.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::GradeOutOfRange`] unless `1 <= grade <= num_grades`.
    #[allow(clippy::cast_precision_loss)]
    pub fn grade_scaled(&self, grade: usize, num_grades: usize) -> Result<HardnessGrid> {
        if grade == 0 || grade > num_grades {
            return Err(GridError::GradeOutOfRange { grade, num_grades });
        }

        let k = num_grades as f64;
        let low = (grade - 1) as f64 / k * 100.0;
        let high = grade as f64 / k * 100.0;

        let min = self.grid.min();
        let max = self.grid.max();
        let span = max - min;

        if span <= f64::EPSILON {
            return Ok(HardnessGrid::repeat((low + high) / 2.0));
        }

        Ok(self
            .grid
            .map(|v| ((v - min) / span).mul_add(high - low, low)))
    }
}

/// Maps 239 per-channel values onto the 9×11 lattice.
///
/// Synthesis is a pure function of the values: the geometry and lattice are
/// fixed at construction and nothing is cached between calls.
///
/// # Example
///
/// ```
/// use nalgebra::Point2;
/// use tactile_grid::{GridConfig, GridSynthesizer};
/// use tactile_types::{ContactGeometry, CONTACT_CHANNELS};
///
/// let points = (0..CONTACT_CHANNELS)
///     .map(|i| Point2::new((i % 16) as f64, (i / 16) as f64))
///     .collect();
/// let geometry = ContactGeometry::from_points(points).unwrap();
///
/// let synth = GridSynthesizer::new(&geometry, GridConfig::default()).unwrap();
/// let result = synth.synthesize(&vec![7.0; CONTACT_CHANNELS]).unwrap();
///
/// assert_eq!(result.grid().len(), 99);
/// assert!(result.grid().iter().all(|v| (v - 7.0).abs() < 1e-9));
/// ```
#[derive(Debug, Clone)]
pub struct GridSynthesizer {
    points: Vec<Point2<f64>>,
    lattice: Lattice,
    config: GridConfig,
}

impl GridSynthesizer {
    /// Creates a synthesizer for a geometry.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the geometry
    /// extent has no area.
    pub fn new(geometry: &ContactGeometry, config: GridConfig) -> Result<Self> {
        config.validate()?;
        let lattice = Lattice::over(geometry.extent())?;
        Ok(Self {
            points: geometry.points().to_vec(),
            lattice,
            config,
        })
    }

    /// Returns the lattice.
    #[must_use]
    pub const fn lattice(&self) -> &Lattice {
        &self.lattice
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Interpolates channel values onto every lattice node.
    ///
    /// Non-finite values are treated as 0.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::ChannelCountMismatch`] if `values` does not have
    /// one entry per contact point.
    pub fn synthesize(&self, values: &[f64]) -> Result<GridSynthesis> {
        if values.len() != self.points.len() {
            return Err(GridError::channel_mismatch(self.points.len(), values.len()));
        }

        let values: Vec<f64> = values
            .iter()
            .map(|&v| if v.is_finite() { v } else { 0.0 })
            .collect();

        let mut grid = HardnessGrid::zeros();
        let mut gaps = Vec::new();

        for (row, col, node) in self.lattice.nodes() {
            let (nearest_channel, nearest_distance) = self.nearest(&node);

            if nearest_distance > self.config.radius {
                gaps.push(InterpolationGap {
                    row,
                    col,
                    nearest_channel,
                    distance: nearest_distance,
                });
            }

            grid[(row, col)] = if nearest_distance <= EXACT_HIT_DISTANCE
                || nearest_distance > self.config.radius
            {
                values[nearest_channel]
            } else {
                match self.config.method {
                    InterpolationMethod::Nearest => values[nearest_channel],
                    InterpolationMethod::InverseDistance => self.weighted(&node, &values),
                }
            };
        }

        if !gaps.is_empty() {
            debug!(
                gaps = gaps.len(),
                nodes = GRID_ROWS * GRID_COLS,
                radius = self.config.radius,
                "grid nodes outside contact radius"
            );
        }

        Ok(GridSynthesis { grid, gaps })
    }

    /// Nearest contact point to `node`; ties resolve to the lowest channel.
    fn nearest(&self, node: &Point2<f64>) -> (usize, f64) {
        let mut best = (0, f64::INFINITY);
        for (channel, point) in self.points.iter().enumerate() {
            let d = distance(node, point);
            if d < best.1 {
                best = (channel, d);
            }
        }
        best
    }

    /// Inverse-distance blend of the points within the radius.
    ///
    /// Only called when at least one point lies within the radius and none
    /// coincides with the node.
    fn weighted(&self, node: &Point2<f64>, values: &[f64]) -> f64 {
        let mut weight_sum = 0.0;
        let mut value_sum = 0.0;
        for (point, value) in self.points.iter().zip(values) {
            let d = distance(node, point);
            if d <= self.config.radius {
                let w = idw_weight(d, self.config.power);
                weight_sum += w;
                value_sum += w * value;
            }
        }
        value_sum / weight_sum
    }
}

#[cfg(test)]
#[allow(clippy::cast_precision_loss, clippy::float_cmp)]
mod tests {
    use approx::assert_relative_eq;
    use proptest::prelude::*;
    use tactile_types::CONTACT_CHANNELS;

    use super::*;

    /// 16 columns by 15 rows of unit-spaced points; the last slot is empty.
    fn geometry() -> ContactGeometry {
        let points = (0..CONTACT_CHANNELS)
            .map(|i| Point2::new((i % 16) as f64, (i / 16) as f64))
            .collect();
        ContactGeometry::from_points(points).unwrap()
    }

    fn synth(config: GridConfig) -> GridSynthesizer {
        GridSynthesizer::new(&geometry(), config).unwrap()
    }

    #[test]
    fn grid_is_9_by_11() {
        let result = synth(GridConfig::default())
            .synthesize(&vec![1.0; CONTACT_CHANNELS])
            .unwrap();
        assert_eq!(result.grid().nrows(), 9);
        assert_eq!(result.grid().ncols(), 11);
        assert_eq!(result.grid().iter().count(), 99);
    }

    #[test]
    fn uniform_values_give_uniform_grid() {
        let result = synth(GridConfig::default())
            .synthesize(&vec![42.0; CONTACT_CHANNELS])
            .unwrap();
        for v in result.grid().iter() {
            assert_relative_eq!(*v, 42.0, epsilon = 1e-9);
        }
        assert!(!result.has_gaps());
    }

    #[test]
    fn exact_hit_takes_point_value() {
        let values: Vec<f64> = (0..CONTACT_CHANNELS).map(|i| i as f64).collect();
        let result = synth(GridConfig::default()).synthesize(&values).unwrap();
        // Node (0, 0) sits on channel 0, node (0, 2) at x = 3 on channel 3.
        assert_eq!(result.grid()[(0, 0)], 0.0);
        assert_eq!(result.grid()[(0, 2)], 3.0);
        // Node (4, 0) at y = 7 on channel 112.
        assert_eq!(result.grid()[(4, 0)], 112.0);
    }

    #[test]
    fn inverse_distance_between_two_values() {
        let mut values = vec![0.0; CONTACT_CHANNELS];
        values[1] = 10.0;
        let result = synth(GridConfig::default().with_radius(0.6))
            .synthesize(&values)
            .unwrap();
        // Node (0, 1) at x = 1.5 is equidistant from channels 1 and 2.
        assert_relative_eq!(result.grid()[(0, 1)], 5.0, epsilon = 1e-9);
    }

    #[test]
    fn nearest_method_ties_to_lowest_channel() {
        let mut values = vec![0.0; CONTACT_CHANNELS];
        values[1] = 10.0;
        let result = synth(GridConfig::default().with_method(InterpolationMethod::Nearest))
            .synthesize(&values)
            .unwrap();
        assert_eq!(result.grid()[(0, 1)], 10.0);
    }

    #[test]
    fn small_radius_reports_gaps() {
        let values: Vec<f64> = (0..CONTACT_CHANNELS).map(|i| i as f64).collect();
        let result = synth(GridConfig::default().with_radius(0.1))
            .synthesize(&values)
            .unwrap();

        // Exact hits: rows {0, 4, 8} x even columns, minus the empty corner slot.
        assert_eq!(result.gaps().len(), 99 - 17);

        let gap = result
            .gaps()
            .iter()
            .find(|g| g.row == 0 && g.col == 1)
            .unwrap();
        assert_eq!(gap.nearest_channel, 1);
        assert_relative_eq!(gap.distance, 0.5);
        assert_eq!(result.grid()[(0, 1)], 1.0);
        assert!(gap.to_string().contains("nearest channel 1"));
    }

    #[test]
    fn non_finite_values_treated_as_zero() {
        let mut values = vec![f64::NAN; CONTACT_CHANNELS];
        values[0] = f64::INFINITY;
        let result = synth(GridConfig::default()).synthesize(&values).unwrap();
        assert!(result.grid().iter().all(|v| *v == 0.0));
    }

    #[test]
    fn wrong_value_count_rejected() {
        let result = synth(GridConfig::default()).synthesize(&[1.0; 10]);
        assert!(matches!(
            result,
            Err(GridError::ChannelCountMismatch {
                expected: 239,
                actual: 10
            })
        ));
    }

    #[test]
    fn degenerate_geometry_rejected() {
        let points = (0..CONTACT_CHANNELS)
            .map(|i| Point2::new(i as f64, 3.0))
            .collect();
        let geometry = ContactGeometry::from_points(points).unwrap();
        let result = GridSynthesizer::new(&geometry, GridConfig::default());
        assert!(matches!(result, Err(GridError::DegenerateGeometry { .. })));
    }

    #[test]
    fn grade_scaled_bands() {
        let values: Vec<f64> = (0..CONTACT_CHANNELS).map(|i| i as f64).collect();
        let result = synth(GridConfig::default()).synthesize(&values).unwrap();

        let scaled = result.grade_scaled(2, 4).unwrap();
        assert_relative_eq!(scaled.min(), 25.0, epsilon = 1e-9);
        assert_relative_eq!(scaled.max(), 50.0, epsilon = 1e-9);

        assert!(result.grade_scaled(0, 4).is_err());
        assert!(result.grade_scaled(5, 4).is_err());
    }

    #[test]
    fn grade_scaled_flat_grid_is_midpoint() {
        let result = synth(GridConfig::default())
            .synthesize(&vec![3.0; CONTACT_CHANNELS])
            .unwrap();
        let scaled = result.grade_scaled(4, 4).unwrap();
        assert!(scaled.iter().all(|v| (v - 87.5).abs() < 1e-9));
    }

    proptest! {
        #[test]
        fn synthesis_is_pure_and_bounded(values in prop::collection::vec(-100.0f64..100.0, CONTACT_CHANNELS)) {
            let synth = synth(GridConfig::default());
            let a = synth.synthesize(&values).unwrap();
            let b = synth.synthesize(&values).unwrap();
            prop_assert_eq!(a.grid(), b.grid());

            let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
            let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
            for v in a.grid().iter() {
                prop_assert!(*v >= lo - 1e-9 && *v <= hi + 1e-9);
            }
        }
    }
}
