use crate::numeric::degree_to_radian;
use atrisense_data::{CartesianPoint, Record};
use crossbeam_utils::thread;

/// Converts one record to a Cartesian point.
///
/// `x_angle_deg` is the azimuth and `y_angle_deg` the elevation. Elevation
/// outside [-90, 90] is used as is. Returns `None` for records whose
/// distance is not strictly positive.
pub fn to_cartesian(record: &Record, record_index: usize) -> Option<CartesianPoint> {
    if !record.has_valid_distance() {
        return None;
    }

    // f64 all the way, otherwise the validator tolerance drowns in f32 rounding
    let distance = record.distance_m as f64;
    let azimuth = degree_to_radian(record.x_angle_deg as f64);
    let elevation = degree_to_radian(record.y_angle_deg as f64);

    let (sin_az, cos_az) = azimuth.sin_cos();
    let (sin_el, cos_el) = elevation.sin_cos();

    Some(CartesianPoint {
        x: distance * cos_el * cos_az,
        y: distance * cos_el * sin_az,
        z: distance * sin_el,
        intensity: record.intensity,
        record_index,
    })
}

fn transform_from(records: &[Record], first_index: usize) -> Vec<CartesianPoint> {
    records
        .iter()
        .enumerate()
        .filter_map(|(i, record)| to_cartesian(record, first_index + i))
        .collect()
}

/// Converts records to points, skipping non-positive distances.
/// Output order follows input order.
pub fn transform(records: &[Record]) -> Vec<CartesianPoint> {
    transform_from(records, 0)
}

/// Same as [`transform`], with the records split into contiguous chunks that
/// are converted on `n_threads` scoped threads.
pub fn transform_parallel(records: &[Record], n_threads: usize) -> Vec<CartesianPoint> {
    if n_threads <= 1 || records.len() < n_threads {
        return transform(records);
    }

    let chunk_size = records.len().div_ceil(n_threads);
    let joined = thread::scope(|s| {
        let handles: Vec<_> = records
            .chunks(chunk_size)
            .enumerate()
            .map(|(i, chunk)| s.spawn(move |_| transform_from(chunk, i * chunk_size)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join())
            .collect::<std::thread::Result<Vec<_>>>()
    });

    match joined {
        Ok(Ok(parts)) => parts.concat(),
        Ok(Err(panic)) | Err(panic) => std::panic::resume_unwind(panic),
    }
}
