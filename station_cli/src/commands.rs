//! Subcommand implementations.

use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;

use eyre::{Result, WrapErr};
use station_config::Config;
use station_core::aggregation::Reading;
use station_core::runner::{self, StopSignal};
use station_core::{Station, StationCfg, StationError};
use station_hardware::{HttpUploader, SimulatedPower, SimulatedSensors};

use crate::render;

/// Load and validate; any failure is a configuration error.
pub fn load_config(path: &Path) -> Result<Config> {
    station_config::load_file(path).map_err(|e| StationError::Config(format!("{e:#}")).into())
}

pub fn build_station(
    cfg: &Config,
    dry_run: bool,
) -> Result<Station<SimulatedSensors, HttpUploader>> {
    let sensors = SimulatedSensors::new(cfg.simulation.seed, cfg.simulation.glitch_rate);
    let uploader = HttpUploader::new(
        cfg.network.endpoint.clone(),
        Duration::from_millis(cfg.network.timeout_ms),
        cfg.network.device_id.clone(),
    )
    .wrap_err("create HTTP uploader")?;

    let mut builder = Station::builder()
        .with_source(sensors)
        .with_uploader(uploader)
        .with_config(StationCfg::from(cfg))
        .upload_enabled(!dry_run);
    if cfg.cycle.deep_sleep {
        builder = builder.with_power(Box::new(SimulatedPower::new()));
    }
    Ok(builder.build()?)
}

pub fn run(cfg: &Config, cycles: Option<u64>, dry_run: bool, json: bool) -> Result<()> {
    let mut station = build_station(cfg, dry_run)?;
    tracing::info!(
        endpoint = %cfg.network.endpoint,
        samples = cfg.sensors.sample_count,
        interval_ms = cfg.sensors.sampling_interval_ms,
        cooldown_s = cfg.cycle.cooldown_s,
        dry_run,
        "station starting"
    );

    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || handler_stop.trigger()).wrap_err("install Ctrl-C handler")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let summary = runner::run(&mut station, &stop, cycles, |outcome| {
        if let Err(e) = render::write_outcome(&mut out, outcome, json).and_then(|()| out.flush())
        {
            tracing::warn!(error = %e, "failed to write report");
        }
    });

    // A bounded run that produced nothing deliverable is a failure for scripts.
    if cycles.is_some() && summary.cycles > 0 {
        if summary.faulted == summary.cycles {
            let msg = format!("all {} cycle(s) abandoned", summary.cycles);
            return Err(StationError::Fault(msg).into());
        }
        if summary.upload_failed > 0 && summary.delivered == 0 && !dry_run {
            return Err(StationError::Upload(format!(
                "{} report(s) not delivered to {}",
                summary.upload_failed, cfg.network.endpoint
            ))
            .into());
        }
    }
    Ok(())
}

pub fn self_check(cfg: &Config, json: bool) -> Result<()> {
    let mut station = build_station(cfg, true)?;
    let samples = station.self_check();
    let mut out = io::stdout().lock();
    render::write_self_check(&mut out, &samples, json)?;
    if let Some(bad) = samples.iter().find(|s| s.reading == Reading::Invalid) {
        return Err(StationError::Sensor {
            metric: bad.metric,
            message: "reading invalid or outside bounds".into(),
        }
        .into());
    }
    tracing::info!("self-check passed");
    Ok(())
}

pub fn show_config(cfg: &Config, json: bool) -> Result<()> {
    let text = if json {
        serde_json::to_string_pretty(cfg)?
    } else {
        toml::to_string_pretty(cfg)?
    };
    let mut out = io::stdout().lock();
    writeln!(out, "{text}")?;
    Ok(())
}
