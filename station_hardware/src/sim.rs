//! Simulated sensor front-end.
//!
//! Produces plausible readings around a baseline with uniform noise and a
//! slow pressure drift. A configurable fraction of reads glitch: a bus error,
//! a value outside the physical range, or an in-range spike large enough for
//! the outlier filter to reject.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use station_traits::{BoxError, Metric, SampleSource};

use crate::error::HwError;

/// Pressure drift is kept within this many hPa of the baseline.
const MAX_PRESSURE_DRIFT: f64 = 15.0;
const DRIFT_STEP: f64 = 0.05;
const SPIKE_FACTOR: f64 = 12.0;

/// Baseline and noise amplitude per metric.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimProfile {
    pub temperature: (f64, f64),
    pub humidity: (f64, f64),
    pub pressure: (f64, f64),
    pub soil_moisture: (f64, f64),
}

impl Default for SimProfile {
    fn default() -> Self {
        Self {
            temperature: (24.0, 0.4),
            humidity: (62.0, 1.5),
            pressure: (1011.0, 0.3),
            soil_moisture: (2050.0, 20.0),
        }
    }
}

impl SimProfile {
    fn for_metric(&self, metric: Metric) -> (f64, f64) {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Pressure => self.pressure,
            Metric::SoilMoisture => self.soil_moisture,
        }
    }
}

fn out_of_range(metric: Metric) -> f64 {
    match metric {
        Metric::Temperature => 127.0,
        Metric::Humidity => -1.0,
        Metric::Pressure => 0.0,
        // 12-bit ADC saturation
        Metric::SoilMoisture => 4095.0,
    }
}

pub struct SimulatedSensors {
    rng: StdRng,
    profile: SimProfile,
    glitch_rate: f64,
    pressure_drift: f64,
}

impl SimulatedSensors {
    /// `seed = None` draws from OS entropy.
    pub fn new(seed: Option<u64>, glitch_rate: f64) -> Self {
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s),
            None => StdRng::from_entropy(),
        };
        let glitch_rate = if glitch_rate.is_finite() {
            glitch_rate.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            rng,
            profile: SimProfile::default(),
            glitch_rate,
            pressure_drift: 0.0,
        }
    }

    pub fn with_profile(mut self, profile: SimProfile) -> Self {
        self.profile = profile;
        self
    }

    fn glitch(&mut self, metric: Metric, base: f64, noise: f64) -> Result<f64, HwError> {
        match self.rng.gen_range(0..3) {
            0 => Err(HwError::Bus(metric)),
            1 => Ok(out_of_range(metric)),
            _ => Ok(base + SPIKE_FACTOR * noise.max(f64::EPSILON)),
        }
    }
}

impl SampleSource for SimulatedSensors {
    fn read(&mut self, metric: Metric) -> Result<f64, BoxError> {
        let (mut base, noise) = self.profile.for_metric(metric);
        if metric == Metric::Pressure {
            let step = self.rng.gen_range(-DRIFT_STEP..=DRIFT_STEP);
            self.pressure_drift =
                (self.pressure_drift + step).clamp(-MAX_PRESSURE_DRIFT, MAX_PRESSURE_DRIFT);
            base += self.pressure_drift;
        }

        if self.glitch_rate > 0.0 && self.rng.gen_bool(self.glitch_rate) {
            let v = self.glitch(metric, base, noise)?;
            tracing::trace!(%metric, value = v, "simulated glitch");
            return Ok(v);
        }

        let jitter = if noise > 0.0 {
            self.rng.gen_range(-noise..=noise)
        } else {
            0.0
        };
        let mut v = base + jitter;
        if metric == Metric::Humidity {
            v = v.clamp(0.0, 100.0);
        }
        Ok(v)
    }
}
