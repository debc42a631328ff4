//! A single time-ordered press-test reading.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Result, TactileError};

/// Number of force/torque channels: `[Fx, Fy, Fz, Tx, Ty, Tz]`.
pub const WRENCH_CHANNELS: usize = 6;

/// Number of position channels: `[x, y, z]`.
pub const POSITION_CHANNELS: usize = 3;

/// Number of orientation components.
pub const ORIENTATION_CHANNELS: usize = 4;

/// Number of discrete contact-intensity channels on the sensor pad.
pub const CONTACT_CHANNELS: usize = 239;

/// Short names of the wrench channels, in column order.
pub const WRENCH_NAMES: [&str; WRENCH_CHANNELS] = ["fx", "fy", "fz", "tx", "ty", "tz"];

/// One reading from the press rig.
///
/// Holds the 6-axis wrench, the indenter position and orientation, and the
/// 239 contact intensities in the channel order defined by the
/// [`ContactGeometry`](crate::ContactGeometry) table.
///
/// Values that were missing or unreadable at ingestion are stored as `NaN`;
/// such a frame is not [usable](Self::is_usable).
///
/// # Example
///
/// ```
/// use tactile_types::{RawFrame, CONTACT_CHANNELS};
///
/// let frame = RawFrame::new(
///     [0.0, 3.0, -4.0, 0.0, 0.0, 0.0],
///     [0.0; 3],
///     [1.0, 0.0, 0.0, 0.0],
///     vec![1.0; CONTACT_CHANNELS],
/// )
/// .unwrap();
///
/// assert!((frame.force_magnitude() - 5.0).abs() < 1e-12);
/// assert!(frame.is_usable());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RawFrame {
    wrench: [f64; WRENCH_CHANNELS],
    position: [f64; POSITION_CHANNELS],
    orientation: [f64; ORIENTATION_CHANNELS],
    contacts: Vec<f64>,
}

impl RawFrame {
    /// Creates a new frame.
    ///
    /// # Errors
    ///
    /// Returns [`TactileError::ChannelCountMismatch`] if `contacts` does not
    /// hold exactly [`CONTACT_CHANNELS`] values.
    pub fn new(
        wrench: [f64; WRENCH_CHANNELS],
        position: [f64; POSITION_CHANNELS],
        orientation: [f64; ORIENTATION_CHANNELS],
        contacts: Vec<f64>,
    ) -> Result<Self> {
        if contacts.len() != CONTACT_CHANNELS {
            return Err(TactileError::channel_mismatch(
                CONTACT_CHANNELS,
                contacts.len(),
            ));
        }
        Ok(Self {
            wrench,
            position,
            orientation,
            contacts,
        })
    }

    /// Returns the wrench as `[Fx, Fy, Fz, Tx, Ty, Tz]`.
    #[must_use]
    pub const fn wrench(&self) -> [f64; WRENCH_CHANNELS] {
        self.wrench
    }

    /// Returns the force vector `[Fx, Fy, Fz]`.
    #[must_use]
    pub const fn force(&self) -> [f64; 3] {
        [self.wrench[0], self.wrench[1], self.wrench[2]]
    }

    /// Returns the torque vector `[Tx, Ty, Tz]`.
    #[must_use]
    pub const fn torque(&self) -> [f64; 3] {
        [self.wrench[3], self.wrench[4], self.wrench[5]]
    }

    /// Returns the indenter position `[x, y, z]`.
    #[must_use]
    pub const fn position(&self) -> [f64; POSITION_CHANNELS] {
        self.position
    }

    /// Returns the orientation components.
    #[must_use]
    pub const fn orientation(&self) -> [f64; ORIENTATION_CHANNELS] {
        self.orientation
    }

    /// Returns the contact intensities in channel order.
    #[must_use]
    pub fn contacts(&self) -> &[f64] {
        &self.contacts
    }

    /// Returns the vertical force component.
    #[must_use]
    pub const fn force_z(&self) -> f64 {
        self.wrench[2]
    }

    /// Returns the vertical indenter position.
    #[must_use]
    pub const fn position_z(&self) -> f64 {
        self.position[2]
    }

    /// Returns the magnitude of the force vector.
    #[must_use]
    pub fn force_magnitude(&self) -> f64 {
        let [x, y, z] = self.force();
        x.hypot(y).hypot(z)
    }

    /// Returns the magnitude of the torque vector.
    #[must_use]
    pub fn torque_magnitude(&self) -> f64 {
        let [x, y, z] = self.torque();
        x.hypot(y).hypot(z)
    }

    /// Returns `true` if every value in the frame is finite.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.wrench.iter().all(|v| v.is_finite())
            && self.position.iter().all(|v| v.is_finite())
            && self.orientation.iter().all(|v| v.is_finite())
            && self.contacts.iter().all(|v| v.is_finite())
    }
}
