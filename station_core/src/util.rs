//! Common numeric and time helpers for station_core.

/// Round to `decimals` places, halves away from zero.
#[inline]
pub fn round_to(v: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (v * scale).round() / scale
}

/// Saturating conversion of a duration to whole milliseconds.
#[inline]
pub fn duration_ms(d: std::time::Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
