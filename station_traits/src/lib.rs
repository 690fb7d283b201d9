pub mod clock;

pub use clock::{Clock, MonotonicClock};

use std::fmt;
use std::time::Duration;

/// Error type carried across collaborator boundaries.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Physical quantity measured by the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Temperature,
    Humidity,
    Pressure,
    SoilMoisture,
}

impl Metric {
    /// All metrics in acquisition order.
    pub const ALL: [Metric; 4] = [
        Metric::Temperature,
        Metric::Humidity,
        Metric::Pressure,
        Metric::SoilMoisture,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Metric::Temperature => "temperature",
            Metric::Humidity => "humidity",
            Metric::Pressure => "pressure",
            Metric::SoilMoisture => "soil_moisture",
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sensor front-end: one raw reading of `metric` per call.
pub trait SampleSource {
    fn read(&mut self, metric: Metric) -> Result<f64, BoxError>;
}

/// Network link that delivers serialized reports to the ingestion service.
pub trait Uploader<P: ?Sized> {
    /// Opaque identity of this node as seen by the ingestion service.
    fn device_id(&self) -> String;
    fn send(&mut self, payload: &P) -> Result<(), BoxError>;
}

/// Low-power control used in place of an idle cooldown between cycles.
pub trait PowerControl {
    fn deep_sleep(&mut self, d: Duration) -> Result<(), BoxError>;
}

impl<S: SampleSource + ?Sized> SampleSource for Box<S> {
    fn read(&mut self, metric: Metric) -> Result<f64, BoxError> {
        (**self).read(metric)
    }
}

impl<P: ?Sized, U: Uploader<P> + ?Sized> Uploader<P> for Box<U> {
    fn device_id(&self) -> String {
        (**self).device_id()
    }
    fn send(&mut self, payload: &P) -> Result<(), BoxError> {
        (**self).send(payload)
    }
}

impl<C: PowerControl + ?Sized> PowerControl for Box<C> {
    fn deep_sleep(&mut self, d: Duration) -> Result<(), BoxError> {
        (**self).deep_sleep(d)
    }
}
