//! Comfort index from the band table plus a pressure correction.

use crate::config::{BandId, ComfortBand, PressureThresholds};

/// Index used when no band matches.
pub const NEUTRAL_COMFORT: f64 = 50.0;
const LOW_PRESSURE_PENALTY: f64 = 15.0;
const HIGH_PRESSURE_BONUS: f64 = 5.0;

/// Comfort index (0–100) and the band that produced it, if any.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComfortAssessment<'a> {
    pub index: u8,
    pub band: Option<&'a ComfortBand>,
}

/// Base score of a band before pressure correction.
pub fn band_score(id: BandId, ah: f64, temp_dew_diff: f64) -> f64 {
    match id {
        BandId::VeryHumid => 10.0 + (temp_dew_diff * 10.0).min(20.0),
        BandId::SomewhatHumid => 30.0 + ((temp_dew_diff + 2.0) * 10.0).min(30.0),
        BandId::Moderate => 60.0 + (temp_dew_diff * 6.0).min(30.0),
        BandId::Dry => 90.0 - ah.min(20.0),
    }
}

/// First band, in table order, whose conditions hold.
pub fn select_band(
    bands: &[ComfortBand],
    ah: Option<f64>,
    temp_dew_diff: Option<f64>,
) -> Option<&ComfortBand> {
    bands.iter().find(|b| b.matches(ah, temp_dew_diff))
}

pub fn evaluate<'a>(
    bands: &'a [ComfortBand],
    pressure: &PressureThresholds,
    ah: Option<f64>,
    temp_dew_diff: Option<f64>,
    pressure_hpa: f64,
) -> ComfortAssessment<'a> {
    let band = select_band(bands, ah, temp_dew_diff);
    let mut score = match (band, ah, temp_dew_diff) {
        (Some(b), Some(ah), Some(diff)) => band_score(b.id, ah, diff),
        _ => NEUTRAL_COMFORT,
    };
    if pressure_hpa < pressure.low {
        score -= LOW_PRESSURE_PENALTY;
    } else if pressure_hpa > pressure.high {
        score += HIGH_PRESSURE_BONUS;
    }
    ComfortAssessment {
        index: to_index(score),
        band,
    }
}

/// Round half away from zero, then clamp to [0, 100].
fn to_index(score: f64) -> u8 {
    if score.is_nan() {
        return NEUTRAL_COMFORT as u8;
    }
    score.round().clamp(0.0, 100.0) as u8
}
