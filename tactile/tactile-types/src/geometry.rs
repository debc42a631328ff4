//! Physical layout of the contact channels.
//!
//! The geometry table assigns each of the 239 contact channels a 2D position
//! on the sensor pad. It is supplied externally, loaded once per process and
//! never modified afterwards.
//!
//! # File Format
//!
//! One channel per line, in channel order, with columns `X, Y[, Z]`
//! separated by commas, tabs or spaces. Blank lines and `#` comments are
//! skipped, as is a single leading header line such as `X,Y,Z`.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use nalgebra::Point2;
use tracing::debug;

use crate::error::{Result, TactileError};
use crate::frame::CONTACT_CHANNELS;

/// Axis-aligned bounds of the contact points.
///
/// # Example
///
/// ```
/// use nalgebra::Point2;
/// use tactile_types::Extent;
///
/// let extent = Extent::new(Point2::new(0.0, 0.0), Point2::new(10.0, 8.0));
/// assert!((extent.width() - 10.0).abs() < 1e-12);
/// assert!((extent.center().y - 4.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    /// Minimum corner.
    pub min: Point2<f64>,
    /// Maximum corner.
    pub max: Point2<f64>,
}

impl Extent {
    /// Creates an extent from two corners.
    #[must_use]
    pub fn new(min: Point2<f64>, max: Point2<f64>) -> Self {
        Self { min, max }
    }

    /// Returns the extent along x.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Returns the extent along y.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Returns the center point.
    #[must_use]
    pub fn center(&self) -> Point2<f64> {
        nalgebra::center(&self.min, &self.max)
    }

    /// Returns `true` if the extent has zero width or height.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.width() <= f64::EPSILON || self.height() <= f64::EPSILON
    }
}

/// Channel index to 2D coordinate table.
///
/// # Example
///
/// ```
/// use nalgebra::Point2;
/// use tactile_types::{ContactGeometry, CONTACT_CHANNELS};
///
/// let points: Vec<Point2<f64>> = (0..CONTACT_CHANNELS)
///     .map(|i| Point2::new((i % 16) as f64, (i / 16) as f64))
///     .collect();
///
/// let geometry = ContactGeometry::from_points(points).unwrap();
/// assert_eq!(geometry.len(), CONTACT_CHANNELS);
/// assert!(!geometry.extent().is_degenerate());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ContactGeometry {
    points: Vec<Point2<f64>>,
    extent: Extent,
}

impl ContactGeometry {
    /// Creates a geometry table from channel coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error if the number of points is not [`CONTACT_CHANNELS`]
    /// or a coordinate is not finite.
    pub fn from_points(points: Vec<Point2<f64>>) -> Result<Self> {
        if points.len() != CONTACT_CHANNELS {
            return Err(TactileError::channel_mismatch(CONTACT_CHANNELS, points.len()));
        }
        if let Some(index) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(TactileError::invalid_geometry(format!(
                "channel {index} has a non-finite coordinate"
            )));
        }

        let mut min = points[0];
        let mut max = points[0];
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }

        Ok(Self {
            points,
            extent: Extent::new(min, max),
        })
    }

    /// Loads a geometry table from a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or does not describe
    /// exactly [`CONTACT_CHANNELS`] points.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let geometry = Self::from_reader(file)?;
        debug!(path = %path.display(), "loaded contact geometry");
        Ok(geometry)
    }

    /// Parses a geometry table from a reader.
    ///
    /// # Errors
    ///
    /// Returns an error on IO failure, an unparseable data line, or a wrong
    /// number of points.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let reader = BufReader::new(reader);
        let mut points = Vec::with_capacity(CONTACT_CHANNELS);
        let mut header_skipped = false;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line
                .split(|c: char| c == ',' || c.is_whitespace())
                .filter(|s| !s.is_empty())
                .collect();

            let x = parts.first().and_then(|s| s.parse::<f64>().ok());
            let y = parts.get(1).and_then(|s| s.parse::<f64>().ok());

            match (x, y) {
                (Some(x), Some(y)) => points.push(Point2::new(x, y)),
                // Header line before any data
                _ if points.is_empty() && !header_skipped => header_skipped = true,
                _ => {
                    return Err(TactileError::invalid_geometry(format!(
                        "line {} is not an `X, Y` coordinate pair: {line}",
                        line_no + 1
                    )));
                }
            }
        }

        Self::from_points(points)
    }

    /// Returns the coordinate of a channel.
    #[must_use]
    pub fn point(&self, channel: usize) -> Option<Point2<f64>> {
        self.points.get(channel).copied()
    }

    /// Returns all coordinates in channel order.
    #[must_use]
    pub fn points(&self) -> &[Point2<f64>] {
        &self.points
    }

    /// Returns the number of channels (always [`CONTACT_CHANNELS`]).
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always `false` for a constructed table.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the bounding extent of all channels.
    #[must_use]
    pub const fn extent(&self) -> Extent {
        self.extent
    }
}
