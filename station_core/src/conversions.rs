//! `From` implementations bridging `station_config` types to `station_core` types.

use std::time::Duration;

use crate::config::{
    AlertThresholds, ComfortBand, CooldownMode, Fallbacks, ForecastLabels, ModelCfg,
    PressureThresholds, RegressionCoeffs, RetryPolicy, SamplingCfg, SensorBounds, StationCfg,
    ValidRange,
};

// ── Sampling ─────────────────────────────────────────────────────────────────

impl From<station_config::Range> for ValidRange {
    fn from(r: station_config::Range) -> Self {
        Self::new(r.min, r.max)
    }
}

impl From<&station_config::Bounds> for SensorBounds {
    fn from(b: &station_config::Bounds) -> Self {
        Self {
            temperature: b.temperature.into(),
            humidity: b.humidity.into(),
            pressure: b.pressure.into(),
            soil_moisture: b.soil_moisture.into(),
        }
    }
}

impl From<&station_config::Config> for SamplingCfg {
    fn from(c: &station_config::Config) -> Self {
        Self {
            sample_count: c.sensors.sample_count,
            interval: Duration::from_millis(c.sensors.sampling_interval_ms),
            bounds: (&c.bounds).into(),
        }
    }
}

impl From<&station_config::Defaults> for Fallbacks {
    fn from(d: &station_config::Defaults) -> Self {
        Self {
            temperature: d.temperature,
            humidity: d.humidity,
            pressure: d.pressure,
            soil_moisture: d.soil_moisture,
        }
    }
}

// ── Model ────────────────────────────────────────────────────────────────────

impl From<&station_config::Regression> for RegressionCoeffs {
    fn from(r: &station_config::Regression) -> Self {
        Self {
            intercept: r.intercept,
            ah: r.ah,
            temp_dew_reciprocal: r.temp_dew_reciprocal,
            soil: r.soil,
            pressure: r.pressure,
            pressure_trend: r.pressure_trend,
        }
    }
}

impl From<&station_config::Band> for ComfortBand {
    fn from(b: &station_config::Band) -> Self {
        Self {
            id: b.id,
            ah_min: b.ah_min,
            temp_dew_max: b.temp_dew_max,
            rain_prob: b.rain_prob,
            comfort: b.comfort.clone(),
            description: b.description.clone(),
        }
    }
}

impl From<&station_config::PressureCfg> for PressureThresholds {
    fn from(p: &station_config::PressureCfg) -> Self {
        Self {
            high: p.high,
            normal: p.normal,
            low: p.low,
            storm: p.storm,
            trend_threshold: p.trend_threshold,
        }
    }
}

impl From<&station_config::AlertsCfg> for AlertThresholds {
    fn from(a: &station_config::AlertsCfg) -> Self {
        Self {
            heat_c: a.heat_c,
            cold_c: a.cold_c,
            rain_severe: a.rain_severe,
            rain_elevated: a.rain_elevated,
        }
    }
}

impl From<&station_config::ForecastCfg> for ForecastLabels {
    fn from(f: &station_config::ForecastCfg) -> Self {
        Self {
            stable: f.stable_label.clone(),
            undetermined: f.undetermined_label.clone(),
        }
    }
}

impl From<&station_config::Config> for ModelCfg {
    fn from(c: &station_config::Config) -> Self {
        Self {
            regression: (&c.regression).into(),
            bands: c.bands.iter().map(ComfortBand::from).collect(),
            pressure: (&c.pressure).into(),
            alerts: (&c.alerts).into(),
            labels: (&c.forecast).into(),
        }
    }
}

// ── Cycle ────────────────────────────────────────────────────────────────────

impl From<&station_config::Network> for RetryPolicy {
    fn from(n: &station_config::Network) -> Self {
        Self {
            max_retries: n.max_retries,
            pause: Duration::from_millis(n.retry_pause_ms),
        }
    }
}

impl From<&station_config::CycleCfg> for CooldownMode {
    fn from(c: &station_config::CycleCfg) -> Self {
        let d = Duration::from_secs(c.cooldown_s);
        if c.deep_sleep {
            CooldownMode::DeepSleep(d)
        } else {
            CooldownMode::Idle(d)
        }
    }
}

impl From<&station_config::Config> for StationCfg {
    fn from(c: &station_config::Config) -> Self {
        Self {
            sampling: c.into(),
            fallbacks: (&c.defaults).into(),
            model: c.into(),
            retry: (&c.network).into(),
            cooldown: (&c.cycle).into(),
        }
    }
}
