//! State carried from one cycle to the next.

use crate::config::Fallbacks;
use crate::trend::PressureHistory;
use station_traits::Metric;

/// Most recent fresh aggregate per metric, seeded from configured defaults.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LastValidReading {
    temperature: f64,
    humidity: f64,
    pressure: f64,
    soil_moisture: f64,
}

impl LastValidReading {
    pub fn seeded(fallbacks: &Fallbacks) -> Self {
        Self {
            temperature: fallbacks.temperature,
            humidity: fallbacks.humidity,
            pressure: fallbacks.pressure,
            soil_moisture: fallbacks.soil_moisture,
        }
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Temperature => self.temperature,
            Metric::Humidity => self.humidity,
            Metric::Pressure => self.pressure,
            Metric::SoilMoisture => self.soil_moisture,
        }
    }

    pub fn set(&mut self, metric: Metric, value: f64) {
        let slot = match metric {
            Metric::Temperature => &mut self.temperature,
            Metric::Humidity => &mut self.humidity,
            Metric::Pressure => &mut self.pressure,
            Metric::SoilMoisture => &mut self.soil_moisture,
        };
        *slot = value;
    }
}

/// Cross-cycle state; owned by the station and mutated only by its cycle.
#[derive(Debug, Clone)]
pub struct StationState {
    pub pressure_history: PressureHistory,
    pub last_valid: LastValidReading,
}

impl StationState {
    pub fn new(fallbacks: &Fallbacks) -> Self {
        Self {
            pressure_history: PressureHistory::new(),
            last_valid: LastValidReading::seeded(fallbacks),
        }
    }
}
