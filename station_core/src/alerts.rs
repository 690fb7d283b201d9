//! Threshold alerts.
//!
//! Three independent groups, evaluated in order: rain, pressure, temperature.
//! Within a group the first matching condition wins. A group whose input is
//! undetermined or non-finite is skipped.

use std::fmt;

use crate::config::{AlertThresholds, PressureThresholds};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Alert {
    SevereRain { above: f64 },
    ElevatedRain { above: f64 },
    SevereStorm { below_hpa: f64 },
    BadWeather { below_hpa: f64 },
    RapidPressureDrop { trend_hpa: f64 },
    Heat { above_c: f64 },
    Cold { below_c: f64 },
}

impl Alert {
    /// Stable machine-readable name.
    pub fn code(&self) -> &'static str {
        match self {
            Alert::SevereRain { .. } => "severe_rain",
            Alert::ElevatedRain { .. } => "elevated_rain",
            Alert::SevereStorm { .. } => "severe_storm",
            Alert::BadWeather { .. } => "bad_weather",
            Alert::RapidPressureDrop { .. } => "rapid_pressure_drop",
            Alert::Heat { .. } => "heat",
            Alert::Cold { .. } => "cold",
        }
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Alert::SevereRain { above } => {
                write!(f, "WARNING: very high chance of rain (>{:.0}%)", above * 100.0)
            }
            Alert::ElevatedRain { above } => {
                write!(f, "Notice: high chance of rain (>{:.0}%)", above * 100.0)
            }
            Alert::SevereStorm { below_hpa } => write!(
                f,
                "Extremely low pressure (<{below_hpa:.0} hPa): severe storm risk"
            ),
            Alert::BadWeather { below_hpa } => {
                write!(f, "Low pressure (<{below_hpa:.0} hPa): bad weather likely")
            }
            Alert::RapidPressureDrop { trend_hpa } => write!(
                f,
                "Pressure falling fast ({trend_hpa:+.1} hPa): rain may arrive soon"
            ),
            Alert::Heat { above_c } => write!(f, "Dangerous heat: >{above_c:.0}°C"),
            Alert::Cold { below_c } => write!(f, "Low temperature: <{below_c:.0}°C"),
        }
    }
}

/// Inputs the alert checks look at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertInputs {
    pub rain_probability: Option<f64>,
    pub pressure: f64,
    pub pressure_trend: f64,
    pub temperature: f64,
}

pub fn generate(
    limits: &AlertThresholds,
    pressure: &PressureThresholds,
    input: &AlertInputs,
) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if let Some(rain) = input.rain_probability.filter(|p| p.is_finite()) {
        if rain > limits.rain_severe {
            alerts.push(Alert::SevereRain {
                above: limits.rain_severe,
            });
        } else if rain > limits.rain_elevated {
            alerts.push(Alert::ElevatedRain {
                above: limits.rain_elevated,
            });
        }
    }

    if input.pressure.is_finite() {
        if input.pressure < pressure.storm {
            alerts.push(Alert::SevereStorm {
                below_hpa: pressure.storm,
            });
        } else if input.pressure < pressure.low {
            alerts.push(Alert::BadWeather {
                below_hpa: pressure.low,
            });
        } else if input.pressure_trend < pressure.trend_threshold {
            alerts.push(Alert::RapidPressureDrop {
                trend_hpa: input.pressure_trend,
            });
        }
    }

    if input.temperature.is_finite() {
        if input.temperature > limits.heat_c {
            alerts.push(Alert::Heat {
                above_c: limits.heat_c,
            });
        } else if input.temperature < limits.cold_c {
            alerts.push(Alert::Cold {
                below_c: limits.cold_c,
            });
        }
    }

    alerts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(rain: Option<f64>, p: f64, trend: f64, t: f64) -> Vec<&'static str> {
        let input = AlertInputs {
            rain_probability: rain,
            pressure: p,
            pressure_trend: trend,
            temperature: t,
        };
        generate(
            &AlertThresholds::default(),
            &PressureThresholds::default(),
            &input,
        )
        .iter()
        .map(Alert::code)
        .collect()
    }

    #[test]
    fn storm_excludes_bad_weather() {
        assert_eq!(run(None, 975.0, -5.0, 20.0), vec!["severe_storm"]);
        assert_eq!(run(None, 990.0, -5.0, 20.0), vec!["bad_weather"]);
        assert_eq!(run(None, 1010.0, -2.5, 20.0), vec!["rapid_pressure_drop"]);
        assert!(run(None, 1010.0, -2.0, 20.0).is_empty());
    }

    #[test]
    fn groups_fire_independently_in_order() {
        assert_eq!(
            run(Some(0.9), 975.0, 0.0, 36.0),
            vec!["severe_rain", "severe_storm", "heat"]
        );
        assert_eq!(run(Some(0.7), 1015.0, 0.0, 5.0), vec!["elevated_rain", "cold"]);
        assert!(run(Some(0.6), 1015.0, 0.0, 10.0).is_empty());
    }

    #[test]
    fn non_finite_inputs_are_skipped() {
        assert!(run(Some(f64::NAN), f64::NAN, -10.0, f64::NAN).is_empty());
    }

    #[test]
    fn messages_carry_thresholds() {
        let a = Alert::SevereRain { above: 0.8 };
        assert_eq!(a.to_string(), "WARNING: very high chance of rain (>80%)");
        let s = Alert::SevereStorm { below_hpa: 980.0 };
        assert!(s.to_string().contains("<980 hPa"));
    }
}
