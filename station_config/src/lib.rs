#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the telemetry node.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Every section has defaults matching the field-deployed node, so an
//!   empty file is a valid configuration.
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Inclusive physical range a raw reading must fall in to be accepted.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Sensors {
    /// Raw ticks collected per cycle.
    pub sample_count: usize,
    /// Pause between ticks (ms). No pause follows the final tick.
    pub sampling_interval_ms: u64,
}

impl Default for Sensors {
    fn default() -> Self {
        Self {
            sample_count: 10,
            sampling_interval_ms: 5_000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Bounds {
    pub temperature: Range,
    pub humidity: Range,
    pub pressure: Range,
    /// ADC counts; the probe reports 0..4095 but only this window is trusted.
    pub soil_moisture: Range,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            temperature: Range::new(-40.0, 85.0),
            humidity: Range::new(0.0, 100.0),
            pressure: Range::new(300.0, 1100.0),
            soil_moisture: Range::new(1000.0, 3000.0),
        }
    }
}

/// Seed values for the last-valid-reading memory.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub soil_moisture: f64,
}

impl Default for Defaults {
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
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Regression {
    pub intercept: f64,
    pub ah: f64,
    pub temp_dew_reciprocal: f64,
    pub soil: f64,
    pub pressure: f64,
    pub pressure_trend: f64,
}

impl Default for Regression {
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

/// Selects the comfort formula of a band. Formula choice never depends on
/// the band's numeric thresholds or its position in the table.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum BandId {
    VeryHumid,
    SomewhatHumid,
    Moderate,
    Dry,
}

impl BandId {
    pub fn as_str(self) -> &'static str {
        match self {
            BandId::VeryHumid => "very-humid",
            BandId::SomewhatHumid => "somewhat-humid",
            BandId::Moderate => "moderate",
            BandId::Dry => "dry",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Band {
    pub id: BandId,
    /// Minimum absolute humidity (g/m³).
    pub ah_min: f64,
    /// Maximum temperature/dew-point spread (°C).
    pub temp_dew_max: f64,
    /// Rain probability this band stands for in the forecast table.
    pub rain_prob: f64,
    /// Short comfort label.
    pub comfort: String,
    /// Forecast description.
    pub description: String,
}

pub fn default_bands() -> Vec<Band> {
    let band = |id, ah_min, temp_dew_max, rain_prob, comfort: &str, description: &str| Band {
        id,
        ah_min,
        temp_dew_max,
        rain_prob,
        comfort: comfort.to_string(),
        description: description.to_string(),
    };
    vec![
        band(BandId::VeryHumid, 17.0, 1.0, 0.95, "Oppressive", "Rain almost certain"),
        band(BandId::SomewhatHumid, 15.0, 2.0, 0.75, "Slightly muggy", "Rain likely"),
        band(BandId::Moderate, 12.0, 5.0, 0.30, "Pleasant", "Rain unlikely"),
        band(BandId::Dry, 0.0, 99.0, 0.05, "Dry", "No rain expected"),
    ]
}

/// Pressure thresholds in hPa; `trend_threshold` in hPa across the history window.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PressureCfg {
    pub high: f64,
    pub normal: f64,
    pub low: f64,
    pub storm: f64,
    pub trend_threshold: f64,
}

impl Default for PressureCfg {
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

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertsCfg {
    pub heat_c: f64,
    pub cold_c: f64,
    pub rain_severe: f64,
    pub rain_elevated: f64,
}

impl Default for AlertsCfg {
    fn default() -> Self {
        Self {
            heat_c: 35.0,
            cold_c: 10.0,
            rain_severe: 0.8,
            rain_elevated: 0.6,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastCfg {
    /// Used when the rain probability is below every band.
    pub stable_label: String,
    /// Used when the rain probability could not be computed.
    pub undetermined_label: String,
}

impl Default for ForecastCfg {
    fn default() -> Self {
        Self {
            stable_label: "Stable weather".to_string(),
            undetermined_label: "Cannot be determined".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleCfg {
    /// Idle time between cycles in seconds.
    pub cooldown_s: u64,
    /// Enter hardware deep sleep for the cooldown instead of idling.
    pub deep_sleep: bool,
}

impl Default for CycleCfg {
    fn default() -> Self {
        Self {
            cooldown_s: 60,
            deep_sleep: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Network {
    /// Ingestion endpoint receiving JSON reports via POST.
    pub endpoint: String,
    /// Overrides the identity derived from the host.
    pub device_id: Option<String>,
    pub timeout_ms: u64,
    /// Retries after the first failed attempt.
    pub max_retries: u32,
    pub retry_pause_ms: u64,
}

impl Default for Network {
    fn default() -> Self {
        Self {
            endpoint: "http://127.0.0.1:5000/api/data".to_string(),
            device_id: None,
            timeout_ms: 10_000,
            max_retries: 3,
            retry_pause_ms: 2_000,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

/// Knobs for the simulated sensor front-end.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Simulation {
    /// Fixed RNG seed for reproducible runs; random when absent.
    pub seed: Option<u64>,
    /// Probability in [0, 1] that a single reading is a glitch.
    pub glitch_rate: f64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self {
            seed: None,
            glitch_rate: 0.05,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub sensors: Sensors,
    pub bounds: Bounds,
    pub defaults: Defaults,
    pub regression: Regression,
    #[serde(default = "default_bands")]
    pub bands: Vec<Band>,
    pub pressure: PressureCfg,
    pub alerts: AlertsCfg,
    pub forecast: ForecastCfg,
    pub cycle: CycleCfg,
    pub network: Network,
    pub logging: Logging,
    pub simulation: Simulation,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sensors: Sensors::default(),
            bounds: Bounds::default(),
            defaults: Defaults::default(),
            regression: Regression::default(),
            bands: default_bands(),
            pressure: PressureCfg::default(),
            alerts: AlertsCfg::default(),
            forecast: ForecastCfg::default(),
            cycle: CycleCfg::default(),
            network: Network::default(),
            logging: Logging::default(),
            simulation: Simulation::default(),
        }
    }
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {:?}: {}", path, e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("invalid configuration {:?}: {}", path, e))?;
    cfg.validate()?;
    Ok(cfg)
}

fn check_range(name: &str, r: Range) -> eyre::Result<()> {
    if !(r.min.is_finite() && r.max.is_finite()) {
        eyre::bail!("bounds.{name} must be finite");
    }
    if r.min > r.max {
        eyre::bail!("bounds.{name}.min must be <= max");
    }
    Ok(())
}

fn check_unit(name: &str, v: f64) -> eyre::Result<()> {
    if !(0.0..=1.0).contains(&v) {
        eyre::bail!("{name} must be in [0.0, 1.0]");
    }
    Ok(())
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Sensors
        if self.sensors.sample_count == 0 {
            eyre::bail!("sensors.sample_count must be >= 1");
        }
        if self.sensors.sample_count > 1_000 {
            eyre::bail!("sensors.sample_count is unreasonably large (>1000)");
        }
        if self.sensors.sampling_interval_ms > 60 * 60 * 1000 {
            eyre::bail!("sensors.sampling_interval_ms is unreasonably large (>1h)");
        }

        // Bounds
        check_range("temperature", self.bounds.temperature)?;
        check_range("humidity", self.bounds.humidity)?;
        check_range("pressure", self.bounds.pressure)?;
        check_range("soil_moisture", self.bounds.soil_moisture)?;

        // Defaults must be usable aggregates
        let d = &self.defaults;
        for (name, v) in [
            ("temperature", d.temperature),
            ("humidity", d.humidity),
            ("pressure", d.pressure),
            ("soil_moisture", d.soil_moisture),
        ] {
            if !v.is_finite() {
                eyre::bail!("defaults.{name} must be finite");
            }
        }

        // Regression
        let r = &self.regression;
        if ![
            r.intercept,
            r.ah,
            r.temp_dew_reciprocal,
            r.soil,
            r.pressure,
            r.pressure_trend,
        ]
        .iter()
        .all(|w| w.is_finite())
        {
            eyre::bail!("regression weights must be finite");
        }

        // Bands
        if self.bands.is_empty() {
            eyre::bail!("bands must contain at least one entry");
        }
        for (i, b) in self.bands.iter().enumerate() {
            if self.bands[..i].iter().any(|o| o.id == b.id) {
                eyre::bail!("bands: duplicate id '{}'", b.id.as_str());
            }
            check_unit(&format!("bands[{i}].rain_prob"), b.rain_prob)?;
            if !(b.ah_min.is_finite() && b.temp_dew_max.is_finite()) {
                eyre::bail!("bands[{i}] thresholds must be finite");
            }
        }

        // Pressure
        let p = &self.pressure;
        if !(p.storm <= p.low && p.low <= p.normal && p.normal <= p.high) {
            eyre::bail!("pressure thresholds must satisfy storm <= low <= normal <= high");
        }
        if p.trend_threshold > 0.0 {
            eyre::bail!("pressure.trend_threshold must be <= 0.0");
        }

        // Alerts
        check_unit("alerts.rain_severe", self.alerts.rain_severe)?;
        check_unit("alerts.rain_elevated", self.alerts.rain_elevated)?;
        if self.alerts.rain_elevated > self.alerts.rain_severe {
            eyre::bail!("alerts.rain_elevated must be <= alerts.rain_severe");
        }
        if self.alerts.cold_c > self.alerts.heat_c {
            eyre::bail!("alerts.cold_c must be <= alerts.heat_c");
        }

        // Cycle
        if self.cycle.cooldown_s > 24 * 60 * 60 {
            eyre::bail!("cycle.cooldown_s is unreasonably large (>24h)");
        }

        // Network
        if self.network.endpoint.trim().is_empty() {
            eyre::bail!("network.endpoint must not be empty");
        }
        if self.network.timeout_ms == 0 {
            eyre::bail!("network.timeout_ms must be >= 1");
        }
        if self.network.max_retries > 20 {
            eyre::bail!("network.max_retries is unreasonably large (>20)");
        }
        if self.network.retry_pause_ms > 5 * 60 * 1000 {
            eyre::bail!("network.retry_pause_ms is unreasonably large (>5min)");
        }
        if let Some(id) = &self.network.device_id
            && id.trim().is_empty()
        {
            eyre::bail!("network.device_id must not be blank when set");
        }

        // Logging
        if let Some(rot) = &self.logging.rotation
            && !matches!(rot.as_str(), "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        // Simulation
        check_unit("simulation.glitch_rate", self.simulation.glitch_rate)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_field_defaults() {
        let cfg = load_toml("").expect("parse empty");
        cfg.validate().expect("defaults are valid");
        assert_eq!(cfg.sensors.sample_count, 10);
        assert_eq!(cfg.bands.len(), 4);
        assert_eq!(cfg.bands[0].id, BandId::VeryHumid);
        assert_eq!(cfg.network.max_retries, 3);
        assert_eq!(cfg.network.retry_pause_ms, 2_000);
    }

    #[test]
    fn band_ids_parse_kebab_case() {
        let cfg = load_toml(
            r#"
[[bands]]
id = "somewhat-humid"
ah_min = 15.0
temp_dew_max = 2.0
rain_prob = 0.75
comfort = "Muggy"
description = "Rain likely"
"#,
        )
        .expect("parse");
        assert_eq!(cfg.bands.len(), 1);
        assert_eq!(cfg.bands[0].id, BandId::SomewhatHumid);
    }
}
