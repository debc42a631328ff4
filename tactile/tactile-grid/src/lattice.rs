//! The fixed 9×11 node lattice laid over the contact geometry.

use nalgebra::{Point2, SMatrix};
use tactile_types::Extent;

use crate::error::{GridError, Result};

/// Number of lattice rows (along y).
pub const GRID_ROWS: usize = 9;

/// Number of lattice columns (along x).
pub const GRID_COLS: usize = 11;

/// A 9×11 matrix of continuous hardness scores, row-major over y then x.
pub type HardnessGrid = SMatrix<f64, GRID_ROWS, GRID_COLS>;

/// Evenly spaced nodes spanning a geometry extent.
///
/// Column `c` sits at `x_min + c * width / 10`, row `r` at
/// `y_min + r * height / 8`, so the outer nodes lie on the extent boundary.
///
/// # Example
///
/// ```
/// use nalgebra::Point2;
/// use tactile_grid::Lattice;
/// use tactile_types::Extent;
///
/// let lattice = Lattice::over(Extent::new(Point2::new(0.0, 0.0), Point2::new(10.0, 8.0))).unwrap();
/// let node = lattice.node(8, 10);
/// assert!((node.x - 10.0).abs() < 1e-12);
/// assert!((node.y - 8.0).abs() < 1e-12);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lattice {
    extent: Extent,
}

impl Lattice {
    /// Lays the lattice over an extent.
    ///
    /// # Errors
    ///
    /// Returns [`GridError::DegenerateGeometry`] if the extent has no area.
    pub fn over(extent: Extent) -> Result<Self> {
        if extent.is_degenerate() {
            return Err(GridError::degenerate_geometry(
                extent.width(),
                extent.height(),
            ));
        }
        Ok(Self { extent })
    }

    /// Returns the extent the lattice spans.
    #[must_use]
    pub const fn extent(&self) -> Extent {
        self.extent
    }

    /// Returns the coordinate of a node.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn node(&self, row: usize, col: usize) -> Point2<f64> {
        let x = self.extent.min.x + self.extent.width() * col as f64 / (GRID_COLS - 1) as f64;
        let y = self.extent.min.y + self.extent.height() * row as f64 / (GRID_ROWS - 1) as f64;
        Point2::new(x, y)
    }

    /// Iterates over `(row, col, coordinate)` in row-major order.
    pub fn nodes(&self) -> impl Iterator<Item = (usize, usize, Point2<f64>)> + '_ {
        (0..GRID_ROWS)
            .flat_map(|row| (0..GRID_COLS).map(move |col| (row, col)))
            .map(|(row, col)| (row, col, self.node(row, col)))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn extent(w: f64, h: f64) -> Extent {
        Extent::new(Point2::new(-1.0, 2.0), Point2::new(-1.0 + w, 2.0 + h))
    }

    #[test]
    fn lattice_corners_on_extent() {
        let lattice = Lattice::over(extent(20.0, 16.0)).unwrap();
        let first = lattice.node(0, 0);
        let last = lattice.node(GRID_ROWS - 1, GRID_COLS - 1);
        assert_relative_eq!(first.x, -1.0);
        assert_relative_eq!(first.y, 2.0);
        assert_relative_eq!(last.x, 19.0);
        assert_relative_eq!(last.y, 18.0);
    }

    #[test]
    fn lattice_spacing() {
        let lattice = Lattice::over(extent(20.0, 16.0)).unwrap();
        assert_relative_eq!(lattice.node(0, 1).x - lattice.node(0, 0).x, 2.0);
        assert_relative_eq!(lattice.node(1, 0).y - lattice.node(0, 0).y, 2.0);
    }

    #[test]
    fn lattice_has_99_nodes() {
        let lattice = Lattice::over(extent(1.0, 1.0)).unwrap();
        assert_eq!(lattice.nodes().count(), GRID_ROWS * GRID_COLS);
        let (row, col, _) = lattice.nodes().nth(12).unwrap();
        assert_eq!((row, col), (1, 1));
    }

    #[test]
    fn lattice_rejects_degenerate_extent() {
        let result = Lattice::over(extent(5.0, 0.0));
        assert!(matches!(result, Err(GridError::DegenerateGeometry { .. })));
    }
}
