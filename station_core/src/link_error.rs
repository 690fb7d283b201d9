//! Maps `Box<dyn Error>` from trait boundaries to typed `StationError`.
//!
//! The traits in `station_traits` use `Box<dyn Error + Send + Sync>` so that
//! drivers and transports can surface their own error types; this module
//! converts those to our typed error enum.

use crate::error::StationError;
use station_traits::Metric;

fn looks_like_timeout(e: &(dyn std::error::Error + 'static)) -> bool {
    if let Some(io) = e.downcast_ref::<std::io::Error>() {
        return io.kind() == std::io::ErrorKind::TimedOut;
    }
    let s = e.to_string().to_lowercase();
    s.contains("timed out") || s.contains("timeout")
}

/// Map an uploader error to a typed `StationError`.
pub fn map_link_error(e: &(dyn std::error::Error + 'static)) -> StationError {
    if looks_like_timeout(e) {
        StationError::Timeout("ingestion service")
    } else {
        StationError::Upload(e.to_string())
    }
}

/// Map a sensor driver error to a typed `StationError`.
pub fn map_sensor_error(metric: Metric, e: &(dyn std::error::Error + 'static)) -> StationError {
    if looks_like_timeout(e) {
        StationError::Timeout("sensor")
    } else {
        StationError::Sensor {
            metric,
            message: e.to_string(),
        }
    }
}
