//! Dew point and absolute humidity.
//!
//! Dew point uses the Magnus approximation (a = 17.27, b = 237.7 °C).
//! Saturation vapour pressure for absolute humidity uses the Vaisala
//! coefficients (A = 6.116441 hPa, m = 7.591386, Tn = 240.7263 °C).

const MAGNUS_A: f64 = 17.27;
const MAGNUS_B: f64 = 237.7;

const VAISALA_A: f64 = 6.116441;
const VAISALA_M: f64 = 7.591386;
const VAISALA_TN: f64 = 240.7263;

/// Molar mass of water (g/mol).
const MW_WATER: f64 = 18.016;
/// Universal gas constant (J/(mol·K)).
const R_GAS: f64 = 8.3144;
const KELVIN_OFFSET: f64 = 273.15;

/// Indicators derived from temperature and humidity. `None` means
/// undetermined and must not be read as zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DerivedMetrics {
    /// °C
    pub dew_point: Option<f64>,
    /// g/m³
    pub absolute_humidity: Option<f64>,
    /// Temperature minus dew point (°C).
    pub temp_dew_diff: Option<f64>,
}

#[inline]
fn finite(v: f64) -> Option<f64> {
    v.is_finite().then_some(v)
}

/// Dew point (°C) from temperature (°C) and relative humidity (%).
pub fn dew_point(temp_c: f64, rh_pct: f64) -> Option<f64> {
    if !(temp_c.is_finite() && rh_pct.is_finite()) {
        return None;
    }
    let alpha = (MAGNUS_A * temp_c) / (MAGNUS_B + temp_c) + (rh_pct / 100.0).ln();
    finite((MAGNUS_B * alpha) / (MAGNUS_A - alpha))
}

/// Absolute humidity (g/m³) from temperature (°C) and relative humidity (%).
pub fn absolute_humidity(temp_c: f64, rh_pct: f64) -> Option<f64> {
    if !(temp_c.is_finite() && rh_pct.is_finite()) {
        return None;
    }
    let pws = VAISALA_A * 10f64.powf((VAISALA_M * temp_c) / (temp_c + VAISALA_TN));
    let pw = (rh_pct / 100.0) * pws;
    finite((pw * 100.0 * MW_WATER) / (R_GAS * (temp_c + KELVIN_OFFSET)))
}

pub fn derive(temp_c: f64, rh_pct: f64) -> DerivedMetrics {
    if !(temp_c.is_finite() && rh_pct.is_finite()) {
        return DerivedMetrics::default();
    }
    let dew = dew_point(temp_c, rh_pct);
    DerivedMetrics {
        dew_point: dew,
        absolute_humidity: absolute_humidity(temp_c, rh_pct),
        temp_dew_diff: dew.map(|d| temp_c - d),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_point_20c_60pct() {
        let d = derive(20.0, 60.0);
        let dew = d.dew_point.expect("dew");
        let ah = d.absolute_humidity.expect("ah");
        assert!((dew - 12.0).abs() <= 0.2, "dew {dew}");
        assert!((ah - 10.4).abs() <= 0.3, "ah {ah}");
        assert!((d.temp_dew_diff.expect("diff") - (20.0 - dew)).abs() < 1e-12);
    }

    #[test]
    fn saturated_air_has_zero_spread() {
        let d = derive(15.0, 100.0);
        assert!(d.temp_dew_diff.expect("diff").abs() < 1e-9);
    }

    #[test]
    fn non_finite_inputs_propagate_to_both_outputs() {
        assert_eq!(derive(f64::NAN, 50.0), DerivedMetrics::default());
        assert_eq!(derive(20.0, f64::INFINITY), DerivedMetrics::default());
    }

    #[test]
    fn bone_dry_air_has_no_dew_point() {
        let d = derive(20.0, 0.0);
        assert_eq!(d.dew_point, None);
        assert_eq!(d.temp_dew_diff, None);
        assert_eq!(d.absolute_humidity, Some(0.0));
    }
}
