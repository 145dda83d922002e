#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A measurement converted to Cartesian coordinates (meters).
///
/// Points are produced only for records with a positive distance, so the
/// n-th point does not in general come from the n-th record.
/// `record_index` keeps the link to the record it was derived from.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CartesianPoint {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    /// Return strength, copied from the record.
    pub intensity: u16,
    /// Position of the originating record in the decoded sequence.
    pub record_index: usize,
}

impl CartesianPoint {
    /// Squared Euclidean distance from the sensor origin.
    pub fn squared_norm(&self) -> f64 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    pub fn norm(&self) -> f64 {
        self.squared_norm().sqrt()
    }
}
