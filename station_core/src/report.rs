//! Inference over one aggregate and assembly of the cycle report.

use serde::Serialize;
use station_traits::Metric;

use crate::aggregation::SensorAggregate;
use crate::alerts::{self, Alert, AlertInputs};
use crate::classifier;
use crate::comfort;
use crate::config::ModelCfg;
use crate::derived::{self, DerivedMetrics};
use crate::predictor::{self, RainFeatures};
use crate::util::round_to;

/// Everything inferred from one `SensorAggregate`.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub derived: DerivedMetrics,
    pub rain_probability: Option<f64>,
    pub comfort_index: u8,
    pub comfort_label: Option<String>,
    pub alerts: Vec<Alert>,
    pub weather_description: String,
}

/// Run the inference stages in pipeline order.
pub fn analyze(model: &ModelCfg, agg: &SensorAggregate) -> Analysis {
    let derived = derived::derive(agg.temperature, agg.humidity);
    let rain_probability = predictor::rain_probability(
        &model.regression,
        &RainFeatures {
            absolute_humidity: derived.absolute_humidity,
            temp_dew_diff: derived.temp_dew_diff,
            soil_moisture: agg.soil_moisture,
            pressure: agg.pressure,
            pressure_trend: agg.pressure_trend,
        },
    );
    if rain_probability.is_none() {
        tracing::warn!("rain probability undetermined: derived inputs missing");
    }
    let comfort = comfort::evaluate(
        &model.bands,
        &model.pressure,
        derived.absolute_humidity,
        derived.temp_dew_diff,
        agg.pressure,
    );
    let alerts = alerts::generate(
        &model.alerts,
        &model.pressure,
        &AlertInputs {
            rain_probability,
            pressure: agg.pressure,
            pressure_trend: agg.pressure_trend,
            temperature: agg.temperature,
        },
    );
    let weather_description =
        classifier::describe(&model.bands, &model.labels, rain_probability).to_string();

    Analysis {
        derived,
        rain_probability,
        comfort_index: comfort.index,
        comfort_label: comfort.band.map(|b| b.comfort.clone()),
        alerts,
        weather_description,
    }
}

/// One cycle's complete report. Built once by `assemble`, then only read.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub soil_moisture: f64,
    pub pressure_trend: f64,
    pub dew_point: Option<f64>,
    pub absolute_humidity: Option<f64>,
    pub temp_dew_diff: Option<f64>,
    /// 0.0..=1.0
    pub rain_probability: Option<f64>,
    /// Percent, one decimal.
    pub rain_probability_percent: Option<f64>,
    pub comfort_index: u8,
    pub comfort_label: Option<String>,
    pub alerts: Vec<Alert>,
    pub weather_description: String,
    pub device_id: String,
    /// Unix epoch seconds.
    pub timestamp: u64,
    /// Metrics that fell back to their last valid reading this cycle.
    pub degraded: Vec<Metric>,
}

pub fn assemble(
    agg: &SensorAggregate,
    analysis: Analysis,
    degraded: Vec<Metric>,
    device_id: String,
    timestamp: u64,
) -> WeatherReport {
    let Analysis {
        derived,
        rain_probability,
        comfort_index,
        comfort_label,
        alerts,
        weather_description,
    } = analysis;
    WeatherReport {
        temperature: agg.temperature,
        humidity: agg.humidity,
        pressure: agg.pressure,
        soil_moisture: agg.soil_moisture,
        pressure_trend: agg.pressure_trend,
        dew_point: derived.dew_point,
        absolute_humidity: derived.absolute_humidity,
        temp_dew_diff: derived.temp_dew_diff,
        rain_probability,
        rain_probability_percent: rain_probability.map(|p| round_to(p * 100.0, 1)),
        comfort_index,
        comfort_label,
        alerts,
        weather_description,
        device_id,
        timestamp,
        degraded,
    }
}

/// Wire form expected by the ingestion service. Field names are fixed by
/// that service; undetermined values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadPayload {
    #[serde(rename = "temp")]
    pub temperature: f64,
    #[serde(rename = "humi")]
    pub humidity: f64,
    #[serde(rename = "pres")]
    pub pressure: f64,
    #[serde(rename = "soil")]
    pub soil_moisture: f64,
    #[serde(rename = "ptrend")]
    pub pressure_trend: f64,
    #[serde(rename = "ah")]
    pub absolute_humidity: Option<f64>,
    #[serde(rename = "dew")]
    pub dew_point: Option<f64>,
    #[serde(rename = "rain")]
    pub rain_probability: Option<f64>,
    #[serde(rename = "comfort")]
    pub comfort_index: u8,
    #[serde(rename = "desc")]
    pub weather_description: String,
    pub device_id: String,
    pub timestamp: u64,
}

impl From<&WeatherReport> for UploadPayload {
    fn from(r: &WeatherReport) -> Self {
        Self {
            temperature: r.temperature,
            humidity: r.humidity,
            pressure: r.pressure,
            soil_moisture: r.soil_moisture,
            pressure_trend: r.pressure_trend,
            absolute_humidity: r.absolute_humidity,
            dew_point: r.dew_point,
            rain_probability: r.rain_probability,
            comfort_index: r.comfort_index,
            weather_description: r.weather_description.clone(),
            device_id: r.device_id.clone(),
            timestamp: r.timestamp,
        }
    }
}
