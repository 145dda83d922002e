pub(crate) fn degree_to_radian(degree: f64) -> f64 {
    degree * std::f64::consts::PI / 180.
}

pub(crate) fn ratio_percent(part: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.;
    }
    100. * (part as f64) / (total as f64)
}
