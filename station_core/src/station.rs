//! The station: owns the collaborators, the configuration and the
//! cross-cycle state, and runs one acquisition-to-upload cycle at a time.

use station_traits::clock::{Clock, MonotonicClock};
use station_traits::{PowerControl, SampleSource, Uploader};

use crate::aggregation::{self, RawSample, SensorAggregate};
use crate::config::{CooldownMode, StationCfg};
use crate::error::{BuildError, Result, StationError};
use crate::report::{self, UploadPayload, WeatherReport};
use crate::runner::StopSignal;
use crate::state::StationState;
use crate::upload::{self, Delivery};
use crate::util::duration_ms;

/// What one cycle produced.
#[derive(Debug, Clone)]
pub struct CycleOutcome {
    pub report: WeatherReport,
    pub delivery: Delivery,
    /// Readings rejected during acquisition (all metrics).
    pub invalid_samples: usize,
}

pub struct Station<S, U, C = MonotonicClock> {
    source: S,
    uploader: U,
    clock: C,
    power: Option<Box<dyn PowerControl>>,
    cfg: StationCfg,
    state: StationState,
    upload_enabled: bool,
}

impl<S, U, C> core::fmt::Debug for Station<S, U, C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Station")
            .field("state", &self.state)
            .field("cooldown", &self.cfg.cooldown)
            .field("upload_enabled", &self.upload_enabled)
            .finish()
    }
}

impl<S, U> Station<S, U, MonotonicClock> {
    /// Start building a Station.
    pub fn builder() -> StationBuilder<S, U, MonotonicClock> {
        StationBuilder::new()
    }
}

impl<S, U, C> Station<S, U, C>
where
    S: SampleSource,
    U: Uploader<UploadPayload>,
    C: Clock,
{
    pub fn state(&self) -> &StationState {
        &self.state
    }

    pub fn config(&self) -> &StationCfg {
        &self.cfg
    }

    pub fn uploader(&self) -> &U {
        &self.uploader
    }

    /// One reading per metric, validated; does not touch cross-cycle state.
    pub fn self_check(&mut self) -> Vec<RawSample> {
        aggregation::probe(&mut self.source, &self.cfg.sampling.bounds)
    }

    /// Sample, aggregate, infer, assemble and (unless disabled) upload.
    pub fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let started = self.clock.now();
        let series = aggregation::acquire(&mut self.source, &self.clock, &self.cfg.sampling);
        let reduced = aggregation::reduce(&series, &mut self.state.last_valid);

        let pressure = reduced.pressure.value();
        if !pressure.is_finite() {
            return Err(StationError::State(format!("pressure aggregate is {pressure}")).into());
        }
        let trend = self.state.pressure_history.record(pressure);
        let agg = SensorAggregate::from_reduced(&reduced, trend);
        if !agg.is_finite() {
            return Err(StationError::State(format!("non-finite aggregate {agg:?}")).into());
        }

        let analysis = report::analyze(&self.cfg.model, &agg);
        let report = report::assemble(
            &agg,
            analysis,
            reduced.degraded(),
            self.uploader.device_id(),
            self.clock.unix_secs(),
        );

        let delivery = if self.upload_enabled {
            let payload = UploadPayload::from(&report);
            upload::deliver(&mut self.uploader, &payload, &self.cfg.retry, &self.clock)
        } else {
            Delivery::Skipped
        };

        tracing::info!(
            t = report.temperature,
            h = report.humidity,
            p = report.pressure,
            trend = report.pressure_trend,
            rain = ?report.rain_probability_percent,
            comfort = report.comfort_index,
            alerts = report.alerts.len(),
            degraded = report.degraded.len(),
            delivered = delivery.is_delivered(),
            elapsed_ms = self.clock.ms_since(started),
            "cycle complete"
        );

        Ok(CycleOutcome {
            report,
            delivery,
            invalid_samples: series.invalid_count(),
        })
    }

    /// Wait out the configured cooldown. Idle waits wake early on stop.
    pub fn cool_down(&mut self, stop: &StopSignal) {
        match self.cfg.cooldown {
            CooldownMode::Idle(d) => {
                tracing::info!(ms = duration_ms(d), "cooling down");
                stop.wait(d);
            }
            CooldownMode::DeepSleep(d) => {
                tracing::info!(ms = duration_ms(d), "entering deep sleep");
                let slept = match self.power.as_mut() {
                    Some(p) => p.deep_sleep(d),
                    None => Err("no power controller".into()),
                };
                if let Err(e) = slept {
                    tracing::warn!(error = %e, "deep sleep unavailable, idling instead");
                    stop.wait(d);
                }
            }
        }
    }
}

/// Builder for `Station`. Source and uploader are required.
pub struct StationBuilder<S, U, C> {
    source: Option<S>,
    uploader: Option<U>,
    clock: C,
    power: Option<Box<dyn PowerControl>>,
    cfg: StationCfg,
    upload_enabled: bool,
}

impl<S, U> StationBuilder<S, U, MonotonicClock> {
    pub fn new() -> Self {
        Self {
            source: None,
            uploader: None,
            clock: MonotonicClock::new(),
            power: None,
            cfg: StationCfg::default(),
            upload_enabled: true,
        }
    }
}

impl<S, U> Default for StationBuilder<S, U, MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, U, C> StationBuilder<S, U, C> {
    pub fn with_source(mut self, source: S) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_uploader(mut self, uploader: U) -> Self {
        self.uploader = Some(uploader);
        self
    }

    pub fn with_clock<C2: Clock>(self, clock: C2) -> StationBuilder<S, U, C2> {
        StationBuilder {
            source: self.source,
            uploader: self.uploader,
            clock,
            power: self.power,
            cfg: self.cfg,
            upload_enabled: self.upload_enabled,
        }
    }

    pub fn with_power(mut self, power: Box<dyn PowerControl>) -> Self {
        self.power = Some(power);
        self
    }

    pub fn with_config(mut self, cfg: StationCfg) -> Self {
        self.cfg = cfg;
        self
    }

    /// Disable to compute reports without sending them.
    pub fn upload_enabled(mut self, enabled: bool) -> Self {
        self.upload_enabled = enabled;
        self
    }

    pub fn build(self) -> core::result::Result<Station<S, U, C>, BuildError> {
        let source = self.source.ok_or(BuildError::MissingSource)?;
        let uploader = self.uploader.ok_or(BuildError::MissingUploader)?;
        if matches!(self.cfg.cooldown, CooldownMode::DeepSleep(_)) && self.power.is_none() {
            return Err(BuildError::MissingPowerControl);
        }
        let state = StationState::new(&self.cfg.fallbacks);
        Ok(Station {
            source,
            uploader,
            clock: self.clock,
            power: self.power,
            cfg: self.cfg,
            state,
            upload_enabled: self.upload_enabled,
        })
    }
}
