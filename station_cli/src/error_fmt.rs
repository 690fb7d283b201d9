//! Human-readable error descriptions and structured JSON error formatting.

use station_core::error::{BuildError, StationError};

/// Map an eyre::Report to a human-readable explanation with likely causes and fix hints.
pub fn humanize(err: &eyre::Report) -> String {
    if let Some(be) = err.downcast_ref::<BuildError>() {
        return match be {
            BuildError::MissingSource => {
                "What happened: No sensor source was wired into the station.\nLikely causes: Sensor front-end failed to initialize.\nHow to fix: Check the simulation settings, then rerun with --log-level=debug.".to_string()
            }
            BuildError::MissingUploader => {
                "What happened: No uploader was wired into the station.\nLikely causes: The HTTP client could not be created.\nHow to fix: Check [network] in the config.".to_string()
            }
            BuildError::MissingPowerControl => {
                "What happened: Deep sleep is enabled but no power controller is available.\nLikely causes: cycle.deep_sleep = true on a host without sleep support.\nHow to fix: Set cycle.deep_sleep = false.".to_string()
            }
        };
    }

    if let Some(se) = err.downcast_ref::<StationError>() {
        return match se {
            StationError::Config(msg) => format!(
                "What happened: Invalid configuration ({msg}).\nLikely causes: Missing file, TOML syntax error, or out-of-range values.\nHow to fix: Edit the config file (see etc/station.toml), or inspect the merged result with `station show-config`."
            ),
            StationError::Upload(msg) => format!(
                "What happened: No report reached the ingestion service ({msg}).\nLikely causes: Service down, wrong network.endpoint, or the service rejected the payload.\nHow to fix: Check that the endpoint is reachable, or run with --dry-run to test offline."
            ),
            StationError::Timeout(what) => format!(
                "What happened: Timed out waiting for the {what}.\nLikely causes: Slow or unreachable network, or network.timeout_ms too low.\nHow to fix: Raise network.timeout_ms or check connectivity."
            ),
            StationError::Sensor { metric, message } => format!(
                "What happened: The {metric} sensor is not delivering usable readings ({message}).\nLikely causes: Wiring, power, or bounds.{metric} set too tight.\nHow to fix: Check the sensor, then rerun `station self-check`."
            ),
            other => format!(
                "What happened: {other}.\nLikely causes: See logs.\nHow to fix: Re-run with --log-level=debug or set RUST_LOG for more detail."
            ),
        };
    }

    let msg = err.to_string();
    let mut cause = String::new();
    if let Some(src) = err.source() {
        cause = format!(" Cause: {src}");
    }
    format!(
        "Something went wrong.{cause}\nHow to fix: Re-run with --log-level=debug for details. Original: {msg}"
    )
}

/// Stable exit codes: configuration 2, nothing delivered 3, anything else 1.
pub fn exit_code_for_error(err: &eyre::Report) -> i32 {
    match err.downcast_ref::<StationError>() {
        Some(StationError::Config(_)) => 2,
        Some(StationError::Upload(_) | StationError::Timeout(_)) => 3,
        _ => 1,
    }
}

fn reason_name(err: &eyre::Report) -> &'static str {
    if err.downcast_ref::<BuildError>().is_some() {
        return "Build";
    }
    match err.downcast_ref::<StationError>() {
        Some(StationError::Config(_)) => "Config",
        Some(StationError::Upload(_)) => "Upload",
        Some(StationError::Timeout(_)) => "Timeout",
        Some(StationError::Sensor { .. }) => "Sensor",
        Some(StationError::State(_)) => "State",
        Some(StationError::Fault(_)) => "Fault",
        None => "Error",
    }
}

/// Structured JSON for errors when --json is enabled.
pub fn format_error_json(err: &eyre::Report) -> String {
    serde_json::json!({
        "reason": reason_name(err),
        "message": humanize(err),
        "exit_code": exit_code_for_error(err),
    })
    .to_string()
}
