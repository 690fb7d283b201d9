pub mod error;
pub mod http;
pub mod sim;

use std::time::Duration;

use station_traits::{BoxError, PowerControl};

pub use http::HttpUploader;
pub use sim::{SimProfile, SimulatedSensors};

/// Stand-in for a hardware deep sleep: blocks the thread for the interval.
///
/// A real board resets on wake; the simulation simply resumes.
#[derive(Debug, Default)]
pub struct SimulatedPower {
    naps: u64,
}

impl SimulatedPower {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn naps(&self) -> u64 {
        self.naps
    }
}

impl PowerControl for SimulatedPower {
    fn deep_sleep(&mut self, d: Duration) -> Result<(), BoxError> {
        self.naps += 1;
        tracing::debug!(ms = d.as_millis() as u64, n = self.naps, "simulated deep sleep");
        std::thread::sleep(d);
        Ok(())
    }
}
