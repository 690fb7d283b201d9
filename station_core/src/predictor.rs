//! Linear rain-probability model.

use crate::config::RegressionCoeffs;

/// Pressure the model's pressure feature is measured against (hPa).
pub const REFERENCE_PRESSURE_HPA: f64 = 1013.0;

/// Floor for the temperature/dew-point spread before taking its reciprocal.
pub const MIN_TEMP_DEW_SPREAD: f64 = 0.1;

/// Model inputs for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainFeatures {
    pub absolute_humidity: Option<f64>,
    pub temp_dew_diff: Option<f64>,
    pub soil_moisture: f64,
    pub pressure: f64,
    pub pressure_trend: f64,
}

/// Rain probability in [0, 1], or `None` when any guarded input is
/// undetermined. The trend is not guarded; the tracker always yields a number.
pub fn rain_probability(coeffs: &RegressionCoeffs, f: &RainFeatures) -> Option<f64> {
    let ah = f.absolute_humidity.filter(|v| v.is_finite())?;
    let spread = f.temp_dew_diff.filter(|v| v.is_finite())?;
    if !(f.soil_moisture.is_finite() && f.pressure.is_finite()) {
        return None;
    }
    let prob = coeffs.intercept
        + coeffs.ah * ah
        + coeffs.temp_dew_reciprocal * (1.0 / spread.max(MIN_TEMP_DEW_SPREAD))
        + coeffs.soil * f.soil_moisture
        + coeffs.pressure * (REFERENCE_PRESSURE_HPA - f.pressure)
        + coeffs.pressure_trend * f.pressure_trend.min(0.0);
    Some(prob.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn features() -> RainFeatures {
        RainFeatures {
            absolute_humidity: Some(18.0),
            temp_dew_diff: Some(1.0),
            soil_moisture: 1500.0,
            pressure: 1005.0,
            pressure_trend: -1.0,
        }
    }

    #[test]
    fn matches_hand_computed_value() {
        // -5 + 0.3*18 + 2.5*1 - 0.002*1500 - 0.02*8 + 0.5*-1 = -0.76 -> 0
        let p = rain_probability(&RegressionCoeffs::default(), &features());
        assert_eq!(p, Some(0.0));

        let f = RainFeatures {
            absolute_humidity: Some(22.0),
            temp_dew_diff: Some(0.5),
            soil_moisture: 1000.0,
            ..features()
        };
        // -5 + 6.6 + 5 - 2 - 0.16 - 0.5 = 3.94 -> 1
        assert_eq!(rain_probability(&RegressionCoeffs::default(), &f), Some(1.0));
    }

    #[test]
    fn spread_at_or_below_dew_point_is_floored() {
        let coeffs = RegressionCoeffs {
            intercept: 0.0,
            ah: 0.0,
            temp_dew_reciprocal: 0.01,
            soil: 0.0,
            pressure: 0.0,
            pressure_trend: 0.0,
        };
        for spread in [0.0, -3.0, 0.1] {
            let f = RainFeatures {
                temp_dew_diff: Some(spread),
                ..features()
            };
            let p = rain_probability(&coeffs, &f).expect("determined");
            assert!((p - 0.1).abs() < 1e-12, "spread {spread}: {p}");
        }
    }

    #[test]
    fn positive_trend_does_not_contribute() {
        let coeffs = RegressionCoeffs {
            intercept: 0.5,
            ah: 0.0,
            temp_dew_reciprocal: 0.0,
            soil: 0.0,
            pressure: 0.0,
            pressure_trend: 0.1,
        };
        let rising = RainFeatures {
            pressure_trend: 4.0,
            ..features()
        };
        let falling = RainFeatures {
            pressure_trend: -2.0,
            ..features()
        };
        assert_eq!(rain_probability(&coeffs, &rising), Some(0.5));
        assert!((rain_probability(&coeffs, &falling).expect("p") - 0.3).abs() < 1e-12);
    }

    #[test]
    fn undetermined_inputs_yield_none() {
        let c = RegressionCoeffs::default();
        let cases = [
            RainFeatures {
                absolute_humidity: None,
                ..features()
            },
            RainFeatures {
                temp_dew_diff: None,
                ..features()
            },
            RainFeatures {
                soil_moisture: f64::NAN,
                ..features()
            },
            RainFeatures {
                pressure: f64::NAN,
                ..features()
            },
        ];
        for f in cases {
            assert_eq!(rain_probability(&c, &f), None, "{f:?}");
        }
    }
}
