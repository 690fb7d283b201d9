use station_traits::Metric;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum StationError {
    #[error("sensor error on {metric}: {message}")]
    Sensor { metric: Metric, message: String },
    #[error("upload error: {0}")]
    Upload(String),
    #[error("timeout waiting for {0}")]
    Timeout(&'static str),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("invalid state: {0}")]
    State(String),
    #[error("cycle fault: {0}")]
    Fault(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing sample source")]
    MissingSource,
    #[error("missing uploader")]
    MissingUploader,
    #[error("deep sleep configured without a power controller")]
    MissingPowerControl,
}

pub type Result<T> = eyre::Result<T>;
pub use eyre::Report;
