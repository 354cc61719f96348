// ---------------------------------------------------------------------------
// Small numeric helpers shared by filter defaults and view aggregation
// ---------------------------------------------------------------------------

/// Linearly interpolated percentile, `q` in `0.0..=1.0`.
///
/// Matches the interpolation used by common dataframe libraries: rank
/// `q * (n - 1)` with the fractional part interpolated between neighbours.
/// Returns 0.0 for an empty slice.
pub fn percentile(values: &[f64], q: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] + frac * (sorted[hi] - sorted[lo])
}

/// Median: the mean of the two middle values for an even count.
/// Returns 0.0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    percentile(values, 0.5)
}

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
