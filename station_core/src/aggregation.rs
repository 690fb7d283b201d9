//! Per-cycle acquisition and reduction.
//!
//! `acquire` polls the `SampleSource` `sample_count` times, validating every
//! reading against the configured physical bounds. `reduce` turns the valid
//! readings of each metric into one aggregate: IQR outlier filter, then mean.
//! A metric with nothing left falls back to the last valid reading and is
//! reported as degraded.

use station_traits::clock::Clock;
use station_traits::{Metric, SampleSource};

use crate::config::{SamplingCfg, SensorBounds};
use crate::link_error::map_sensor_error;
use crate::state::LastValidReading;
use crate::stats;

/// Outcome of a single sensor read.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Valid(f64),
    Invalid,
}

impl Reading {
    pub fn value(self) -> Option<f64> {
        match self {
            Reading::Valid(v) => Some(v),
            Reading::Invalid => None,
        }
    }
}

/// One reading tagged with its metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawSample {
    pub metric: Metric,
    pub reading: Reading,
}

/// Read `metric` once and validate it. Driver errors and out-of-range or
/// non-finite values are both `Invalid`; neither aborts the cycle.
pub fn read_validated<S: SampleSource + ?Sized>(
    source: &mut S,
    metric: Metric,
    bounds: &SensorBounds,
) -> RawSample {
    let reading = match source.read(metric) {
        Ok(v) if bounds.for_metric(metric).contains(v) => Reading::Valid(v),
        Ok(v) => {
            tracing::debug!(%metric, value = v, "reading outside physical bounds");
            Reading::Invalid
        }
        Err(e) => {
            let err = map_sensor_error(metric, e.as_ref());
            tracing::debug!(%metric, error = %err, "sensor read failed");
            Reading::Invalid
        }
    };
    RawSample { metric, reading }
}

/// Read every metric once (used by self-check).
pub fn probe<S: SampleSource + ?Sized>(source: &mut S, bounds: &SensorBounds) -> Vec<RawSample> {
    Metric::ALL
        .iter()
        .map(|&m| read_validated(source, m, bounds))
        .collect()
}

/// Valid readings per metric collected over one cycle.
#[derive(Debug, Clone, Default)]
pub struct TickSeries {
    temperature: Vec<f64>,
    humidity: Vec<f64>,
    pressure: Vec<f64>,
    soil_moisture: Vec<f64>,
    invalid: usize,
}

impl TickSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sample: RawSample) {
        match sample.reading {
            Reading::Valid(v) => self.slot_mut(sample.metric).push(v),
            Reading::Invalid => self.invalid += 1,
        }
    }

    pub fn values(&self, metric: Metric) -> &[f64] {
        match metric {
            Metric::Temperature => &self.temperature,
            Metric::Humidity => &self.humidity,
            Metric::Pressure => &self.pressure,
            Metric::SoilMoisture => &self.soil_moisture,
        }
    }

    /// Readings rejected across all metrics.
    pub fn invalid_count(&self) -> usize {
        self.invalid
    }

    fn slot_mut(&mut self, metric: Metric) -> &mut Vec<f64> {
        match metric {
            Metric::Temperature => &mut self.temperature,
            Metric::Humidity => &mut self.humidity,
            Metric::Pressure => &mut self.pressure,
            Metric::SoilMoisture => &mut self.soil_moisture,
        }
    }
}

impl FromIterator<RawSample> for TickSeries {
    fn from_iter<I: IntoIterator<Item = RawSample>>(iter: I) -> Self {
        let mut series = TickSeries::new();
        for s in iter {
            series.push(s);
        }
        series
    }
}

/// Run the sampling ticks of one cycle. Sleeps `interval` between ticks,
/// never after the last one.
pub fn acquire<S, C>(source: &mut S, clock: &C, cfg: &SamplingCfg) -> TickSeries
where
    S: SampleSource + ?Sized,
    C: Clock + ?Sized,
{
    let mut series = TickSeries::new();
    for tick in 0..cfg.sample_count {
        let samples = probe(source, &cfg.bounds);
        tracing::debug!(
            tick = tick + 1,
            of = cfg.sample_count,
            t = ?samples[0].reading.value(),
            h = ?samples[1].reading.value(),
            p = ?samples[2].reading.value(),
            soil = ?samples[3].reading.value(),
            "sample tick"
        );
        for s in samples {
            series.push(s);
        }
        if tick + 1 < cfg.sample_count {
            clock.sleep(cfg.interval);
        }
    }
    series
}

/// Why a metric fell back to its last valid reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degradation {
    /// No valid tick at all.
    NoValidSamples,
    /// Every valid tick was rejected as an outlier.
    AllFiltered,
}

/// Aggregate of one metric for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetricOutcome {
    Fresh { value: f64, used: usize },
    Fallback { value: f64, reason: Degradation },
}

impl MetricOutcome {
    pub fn value(&self) -> f64 {
        match *self {
            MetricOutcome::Fresh { value, .. } | MetricOutcome::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, MetricOutcome::Fallback { .. })
    }
}

fn fall_back(metric: Metric, last_valid: &LastValidReading, reason: Degradation) -> MetricOutcome {
    let value = last_valid.get(metric);
    tracing::warn!(%metric, ?reason, value, "degraded metric, using last valid reading");
    MetricOutcome::Fallback { value, reason }
}

/// Reduce the valid readings of one metric, updating `last_valid` on success.
pub fn reduce_metric(
    metric: Metric,
    values: &[f64],
    last_valid: &mut LastValidReading,
) -> MetricOutcome {
    if values.is_empty() {
        return fall_back(metric, last_valid, Degradation::NoValidSamples);
    }
    let kept = stats::filter_outliers(values);
    match stats::mean(&kept) {
        Some(value) => {
            if kept.len() < values.len() {
                tracing::debug!(
                    %metric,
                    dropped = values.len() - kept.len(),
                    "outliers removed"
                );
            }
            last_valid.set(metric, value);
            MetricOutcome::Fresh {
                value,
                used: kept.len(),
            }
        }
        None => fall_back(metric, last_valid, Degradation::AllFiltered),
    }
}

/// Per-metric outcomes of one cycle, before the pressure trend is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reduced {
    pub temperature: MetricOutcome,
    pub humidity: MetricOutcome,
    pub pressure: MetricOutcome,
    pub soil_moisture: MetricOutcome,
}

impl Reduced {
    pub fn get(&self, metric: Metric) -> MetricOutcome {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Pressure => self.pressure,
            Metric::SoilMoisture => self.soil_moisture,
        }
    }

    /// Metrics that fell back this cycle, in acquisition order.
    pub fn degraded(&self) -> Vec<Metric> {
        Metric::ALL
            .iter()
            .copied()
            .filter(|&m| self.get(m).is_fallback())
            .collect()
    }
}

pub fn reduce(series: &TickSeries, last_valid: &mut LastValidReading) -> Reduced {
    Reduced {
        temperature: reduce_metric(
            Metric::Temperature,
            series.values(Metric::Temperature),
            last_valid,
        ),
        humidity: reduce_metric(Metric::Humidity, series.values(Metric::Humidity), last_valid),
        pressure: reduce_metric(Metric::Pressure, series.values(Metric::Pressure), last_valid),
        soil_moisture: reduce_metric(
            Metric::SoilMoisture,
            series.values(Metric::SoilMoisture),
            last_valid,
        ),
    }
}

/// Final per-cycle sensor values. Always finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorAggregate {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub soil_moisture: f64,
    pub pressure_trend: f64,
}

impl SensorAggregate {
    pub fn from_reduced(r: &Reduced, pressure_trend: f64) -> Self {
        Self {
            temperature: r.temperature.value(),
            humidity: r.humidity.value(),
            pressure: r.pressure.value(),
            soil_moisture: r.soil_moisture.value(),
            pressure_trend,
        }
    }

    pub fn is_finite(&self) -> bool {
        [
            self.temperature,
            self.humidity,
            self.pressure,
            self.soil_moisture,
            self.pressure_trend,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}
