//! Configuration types for the telemetry pipeline.
//!
//! These are the runtime configuration structs used by `Station`.
//! They are separate from the TOML-deserialized config in `station_config`.

use std::time::Duration;

pub use station_config::BandId;
use station_traits::Metric;

/// Inclusive acceptance window for raw readings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidRange {
    pub min: f64,
    pub max: f64,
}

impl ValidRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// NaN is never contained.
    #[inline]
    pub fn contains(&self, v: f64) -> bool {
        self.min <= v && v <= self.max
    }
}

/// Physical bounds per sensor.
#[derive(Debug, Clone, Copy)]
pub struct SensorBounds {
    pub temperature: ValidRange,
    pub humidity: ValidRange,
    pub pressure: ValidRange,
    pub soil_moisture: ValidRange,
}

impl SensorBounds {
    pub fn for_metric(&self, metric: Metric) -> ValidRange {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Pressure => self.pressure,
            Metric::SoilMoisture => self.soil_moisture,
        }
    }
}

impl Default for SensorBounds {
    fn default() -> Self {
        Self {
            temperature: ValidRange::new(-40.0, 85.0),
            humidity: ValidRange::new(0.0, 100.0),
            pressure: ValidRange::new(300.0, 1100.0),
            soil_moisture: ValidRange::new(1000.0, 3000.0),
        }
    }
}

/// Acquisition parameters for one cycle.
#[derive(Debug, Clone)]
pub struct SamplingCfg {
    /// Ticks per cycle; every metric is read once per tick.
    pub sample_count: usize,
    /// Pause between ticks.
    pub interval: Duration,
    pub bounds: SensorBounds,
}

impl Default for SamplingCfg {
    fn default() -> Self {
        Self {
            sample_count: 10,
            interval: Duration::from_secs(5),
            bounds: SensorBounds::default(),
        }
    }
}

/// Values used before any cycle has produced a fresh aggregate.
#[derive(Debug, Clone, Copy)]
pub struct Fallbacks {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub soil_moisture: f64,
}

impl Default for Fallbacks {
    fn default() -> Self {
        Self {
            temperature: 25.0,
            humidity: 50.0,
            pressure: 1013.0,
            soil_moisture: 2000.0,
        }
    }
}

/// Weights of the linear rain model.
#[derive(Debug, Clone, Copy)]
pub struct RegressionCoeffs {
    pub intercept: f64,
    pub ah: f64,
    pub temp_dew_reciprocal: f64,
    pub soil: f64,
    pub pressure: f64,
    pub pressure_trend: f64,
}

impl Default for RegressionCoeffs {
    fn default() -> Self {
        Self {
            intercept: -5.0,
            ah: 0.3,
            temp_dew_reciprocal: 2.5,
            soil: -0.002,
            pressure: -0.02,
            pressure_trend: 0.5,
        }
    }
}

/// One row of the comfort/forecast table.
#[derive(Debug, Clone, PartialEq)]
pub struct ComfortBand {
    pub id: BandId,
    pub ah_min: f64,
    pub temp_dew_max: f64,
    pub rain_prob: f64,
    pub comfort: String,
    pub description: String,
}

impl ComfortBand {
    /// Matching rule; false whenever either input is undetermined.
    pub fn matches(&self, ah: Option<f64>, temp_dew_diff: Option<f64>) -> bool {
        match (ah, temp_dew_diff) {
            (Some(ah), Some(diff)) => ah >= self.ah_min && diff <= self.temp_dew_max,
            _ => false,
        }
    }
}

pub fn default_bands() -> Vec<ComfortBand> {
    station_config::default_bands()
        .iter()
        .map(ComfortBand::from)
        .collect()
}

/// Pressure thresholds in hPa.
#[derive(Debug, Clone, Copy)]
pub struct PressureThresholds {
    pub high: f64,
    pub normal: f64,
    pub low: f64,
    pub storm: f64,
    /// Alert when the window trend falls below this (hPa, negative).
    pub trend_threshold: f64,
}

impl Default for PressureThresholds {
    fn default() -> Self {
        Self {
            high: 1020.0,
            normal: 1013.0,
            low: 1000.0,
            storm: 980.0,
            trend_threshold: -2.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AlertThresholds {
    pub heat_c: f64,
    pub cold_c: f64,
    pub rain_severe: f64,
    pub rain_elevated: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            heat_c: 35.0,
            cold_c: 10.0,
            rain_severe: 0.8,
            rain_elevated: 0.6,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ForecastLabels {
    pub stable: String,
    pub undetermined: String,
}

impl Default for ForecastLabels {
    fn default() -> Self {
        Self {
            stable: "Stable weather".to_string(),
            undetermined: "Cannot be determined".to_string(),
        }
    }
}

/// Everything the inference stages read.
#[derive(Debug, Clone)]
pub struct ModelCfg {
    pub regression: RegressionCoeffs,
    /// Ordered; the comfort evaluator takes the first match.
    pub bands: Vec<ComfortBand>,
    pub pressure: PressureThresholds,
    pub alerts: AlertThresholds,
    pub labels: ForecastLabels,
}

impl Default for ModelCfg {
    fn default() -> Self {
        Self {
            regression: RegressionCoeffs::default(),
            bands: default_bands(),
            pressure: PressureThresholds::default(),
            alerts: AlertThresholds::default(),
            labels: ForecastLabels::default(),
        }
    }
}

/// Upload retry policy.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    pub pause: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            pause: Duration::from_secs(2),
        }
    }
}

/// What the node does between cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownMode {
    /// Stay awake and wait; wakes early on stop.
    Idle(Duration),
    /// Hand the interval to the power controller.
    DeepSleep(Duration),
}

impl CooldownMode {
    pub fn duration(&self) -> Duration {
        match *self {
            CooldownMode::Idle(d) | CooldownMode::DeepSleep(d) => d,
        }
    }
}

impl Default for CooldownMode {
    fn default() -> Self {
        CooldownMode::Idle(Duration::from_secs(60))
    }
}

/// Complete runtime configuration of a station.
#[derive(Debug, Clone, Default)]
pub struct StationCfg {
    pub sampling: SamplingCfg,
    pub fallbacks: Fallbacks,
    pub model: ModelCfg,
    pub retry: RetryPolicy,
    pub cooldown: CooldownMode,
}
