//! Small statistics helpers used by the aggregation stage.
//!
//! Quartiles use a split-halves rule: after sorting, the lower half is
//! `sorted[..n/2]` and the upper half is `sorted[n/2..]`. For odd `n` the
//! middle element therefore only belongs to the upper half. Deployed nodes
//! compute it this way and downstream data depends on it; keep it.

/// Tukey fence multiplier.
pub const IQR_K: f64 = 1.5;

/// Below this many samples outlier filtering is the identity.
pub const MIN_FILTER_SAMPLES: usize = 4;

/// Median of `values`; 0.0 for an empty slice.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    median_sorted(&sorted)
}

fn median_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    let mid = n / 2;
    if n % 2 == 1 {
        sorted[mid]
    } else {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    }
}

/// Inclusive acceptance fences `[Q1 - k·IQR, Q3 + k·IQR]`, or `None` when
/// there are too few samples to filter.
pub fn iqr_fences(values: &[f64]) -> Option<(f64, f64)> {
    if values.len() < MIN_FILTER_SAMPLES {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let half = sorted.len() / 2;
    let q1 = median_sorted(&sorted[..half]);
    let q3 = median_sorted(&sorted[half..]);
    let iqr = q3 - q1;
    Some((q1 - IQR_K * iqr, q3 + IQR_K * iqr))
}

/// Drop values outside the IQR fences, preserving input order.
pub fn filter_outliers(values: &[f64]) -> Vec<f64> {
    match iqr_fences(values) {
        None => values.to_vec(),
        Some((lower, upper)) => values
            .iter()
            .copied()
            .filter(|v| lower <= *v && *v <= upper)
            .collect(),
    }
}

/// Arithmetic mean, `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_handles_empty_odd_even() {
        assert_eq!(median(&[]), 0.0);
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn odd_count_puts_middle_in_upper_half() {
        // sorted: [1, 2, 3, 4, 100]; lower = [1, 2] -> 1.5, upper = [3, 4, 100] -> 4
        let (lo, hi) = iqr_fences(&[100.0, 3.0, 1.0, 4.0, 2.0]).expect("fences");
        assert_eq!(lo, 1.5 - 1.5 * 2.5);
        assert_eq!(hi, 4.0 + 1.5 * 2.5);
    }

    #[test]
    fn fewer_than_four_is_identity() {
        let v = [1.0, 500.0, -3.0];
        assert_eq!(filter_outliers(&v), v.to_vec());
    }

    #[test]
    fn keeps_order_and_boundaries() {
        // sorted [7, 10, 10, 12, 12, 15]; q1 = 10, q3 = 12, fences [7, 15]
        let v = [12.0, 10.0, 12.0, 10.0, 7.0, 15.0];
        assert_eq!(filter_outliers(&v), v.to_vec());
        let v = [12.0, 10.0, 12.0, 10.0, 6.9, 15.0];
        assert_eq!(filter_outliers(&v), vec![12.0, 10.0, 12.0, 10.0, 15.0]);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }
}
