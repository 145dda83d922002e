use crate::error::{DecoderError, Result};
use crate::numeric::ratio_percent;
use atrisense_data::{CartesianPoint, Record, ValidationResult};

/// Checks that a point lies at `original_distance` from the origin.
///
/// Squared values are compared (`|x² + y² + z² - d²| < tolerance`) so no
/// square root is taken. The tolerance is therefore absolute on the squared
/// distance: relative to `d` it tightens as `d` grows, roughly
/// `tolerance / (2 d²)`. Far returns can fail on f32 rounding alone.
pub fn verify_one(point: &CartesianPoint, original_distance: f64, tolerance: f64) -> bool {
    let computed = point.squared_norm();
    (computed - original_distance * original_distance).abs() < tolerance
}

/// Validates every point against the record it was derived from.
///
/// The record is looked up through `point.record_index`, never by position.
pub fn verify_all(
    points: &[CartesianPoint],
    records: &[Record],
    tolerance: f64,
) -> Result<ValidationResult> {
    if points.is_empty() {
        return Err(DecoderError::NoPoints("validate"));
    }

    let mut valid_count = 0;
    for point in points {
        let record = records
            .get(point.record_index)
            .ok_or(DecoderError::Correspondence {
                record_index: point.record_index,
                record_count: records.len(),
            })?;
        if verify_one(point, record.distance_m as f64, tolerance) {
            valid_count += 1;
        }
    }

    Ok(ValidationResult {
        valid_count,
        total_count: points.len(),
        ratio_percent: ratio_percent(valid_count, points.len()),
        tolerance,
    })
}
