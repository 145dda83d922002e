#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One measurement of the rotating rangefinder, as stored on disk.
///
/// Decoding accepts every bit pattern, so `distance_m` may be zero, negative
/// or NaN. Such records are dropped when converting to Cartesian points.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Record {
    /// Index of the revolution this measurement belongs to.
    pub scan_number: u32,
    /// Azimuth in degrees.
    pub x_angle_deg: f32,
    /// Elevation in degrees. Not clamped to [-90, 90].
    pub y_angle_deg: f32,
    /// Measured range in meters.
    pub distance_m: f32,
    /// Return strength of the laser pulse.
    pub intensity: u16,
}

impl Record {
    pub fn new(
        scan_number: u32,
        x_angle_deg: f32,
        y_angle_deg: f32,
        distance_m: f32,
        intensity: u16,
    ) -> Record {
        Record {
            scan_number,
            x_angle_deg,
            y_angle_deg,
            distance_m,
            intensity,
        }
    }

    /// True when the range can be turned into a point.
    pub fn has_valid_distance(&self) -> bool {
        self.distance_m > 0.
    }
}
