#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Summary of a distance validation run over a point set.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ValidationResult {
    /// Number of points whose squared norm matched the record within tolerance.
    pub valid_count: usize,
    /// Number of points checked.
    pub total_count: usize,
    /// `100 * valid_count / total_count`.
    pub ratio_percent: f64,
    /// Absolute tolerance applied to the squared distances.
    pub tolerance: f64,
}

impl ValidationResult {
    pub fn all_valid(&self) -> bool {
        self.valid_count == self.total_count
    }
}
