//! Qualitative forecast from rain probability.

use crate::config::{ComfortBand, ForecastLabels};

/// Description of the highest-probability band not above `prob`.
pub fn describe<'a>(
    bands: &'a [ComfortBand],
    labels: &'a ForecastLabels,
    prob: Option<f64>,
) -> &'a str {
    let Some(prob) = prob.filter(|p| !p.is_nan()) else {
        return &labels.undetermined;
    };
    let mut ordered: Vec<&ComfortBand> = bands.iter().collect();
    ordered.sort_by(|a, b| b.rain_prob.total_cmp(&a.rain_prob));
    ordered
        .into_iter()
        .find(|b| b.rain_prob <= prob)
        .map_or(labels.stable.as_str(), |b| b.description.as_str())
}
