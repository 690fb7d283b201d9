//! Tracing setup: console layer plus an optional JSON-lines file sink.

use std::path::Path;

use eyre::{Result, WrapErr, eyre};
use station_config::Logging;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

fn file_layer(cfg: &Logging) -> Result<Option<(BoxedLayer, WorkerGuard)>> {
    let Some(file) = cfg.file.as_deref() else {
        return Ok(None);
    };
    let path = Path::new(file);
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .ok_or_else(|| eyre!("logging.file {file:?} has no file name"))?;
    let appender = match cfg.rotation.as_deref() {
        Some("daily") => rolling::daily(dir, name),
        Some("hourly") => rolling::hourly(dir, name),
        _ => rolling::never(dir, name),
    };
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let filter = EnvFilter::try_new(cfg.level.as_deref().unwrap_or("info"))
        .wrap_err("logging.level")?;
    let layer = fmt::layer()
        .json()
        .with_ansi(false)
        .with_writer(writer)
        .with_filter(filter)
        .boxed();
    Ok(Some((layer, guard)))
}

/// Install the global subscriber. Keep the returned guard alive for the
/// lifetime of the process so the file sink flushes.
pub fn init_tracing(json: bool, level: &str, cfg: &Logging) -> Result<Option<WorkerGuard>> {
    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(f) => f,
        Err(_) => EnvFilter::try_new(level).wrap_err_with(|| format!("--log-level {level:?}"))?,
    };
    let console: BoxedLayer = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    };

    let mut layers = vec![console];
    let mut guard = None;
    if let Some((layer, g)) = file_layer(cfg)? {
        layers.push(layer);
        guard = Some(g);
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| eyre!("failed to install tracing subscriber: {e}"))?;
    Ok(guard)
}
