//! Report and self-check output: aligned text for people, JSON lines for tools.

use std::io::{self, Write};

use serde_json::{Value, json};
use station_core::aggregation::{RawSample, Reading};
use station_core::{CycleOutcome, Delivery, UploadPayload};

fn opt(v: Option<f64>, prec: usize, unit: &str) -> String {
    match v {
        Some(x) => format!("{x:.prec$}{unit}"),
        None => "n/a".to_string(),
    }
}

fn delivery_text(d: &Delivery) -> String {
    match d {
        Delivery::Delivered { attempts: 1 } => "delivered".to_string(),
        Delivery::Delivered { attempts } => format!("delivered after {attempts} attempts"),
        Delivery::Failed {
            attempts,
            last_error,
        } => format!("FAILED after {attempts} attempts: {last_error}"),
        Delivery::Skipped => "skipped (dry run)".to_string(),
    }
}

fn delivery_json(d: &Delivery) -> Value {
    match d {
        Delivery::Delivered { attempts } => json!({ "status": "delivered", "attempts": attempts }),
        Delivery::Failed {
            attempts,
            last_error,
        } => json!({ "status": "failed", "attempts": attempts, "error": last_error.to_string() }),
        Delivery::Skipped => json!({ "status": "skipped" }),
    }
}

pub fn outcome_json(o: &CycleOutcome) -> Value {
    let r = &o.report;
    json!({
        "payload": UploadPayload::from(r),
        "rain_percent": r.rain_probability_percent,
        "temp_dew_diff": r.temp_dew_diff,
        "comfort_label": r.comfort_label,
        "alerts": r.alerts.iter()
            .map(|a| json!({ "code": a.code(), "message": a.to_string() }))
            .collect::<Vec<_>>(),
        "degraded": r.degraded.iter().map(|m| m.name()).collect::<Vec<_>>(),
        "invalid_samples": o.invalid_samples,
        "delivery": delivery_json(&o.delivery),
    })
}

pub fn write_outcome<W: Write>(w: &mut W, o: &CycleOutcome, json: bool) -> io::Result<()> {
    if json {
        return writeln!(w, "{}", outcome_json(o));
    }
    let r = &o.report;
    writeln!(w, "== report {} @ {} ==", r.device_id, r.timestamp)?;
    writeln!(
        w,
        "  temperature  {:>8.1} °C     humidity  {:>6.1} %",
        r.temperature, r.humidity
    )?;
    writeln!(
        w,
        "  pressure     {:>8.1} hPa    trend     {:>+6.1} hPa",
        r.pressure, r.pressure_trend
    )?;
    writeln!(w, "  soil         {:>8.0}", r.soil_moisture)?;
    writeln!(
        w,
        "  dew point    {:>11}    abs. hum. {}",
        opt(r.dew_point, 1, " °C"),
        opt(r.absolute_humidity, 1, " g/m³")
    )?;
    let comfort = match &r.comfort_label {
        Some(label) => format!("{} ({label})", r.comfort_index),
        None => r.comfort_index.to_string(),
    };
    writeln!(
        w,
        "  rain         {:>10}     comfort   {comfort}",
        opt(r.rain_probability_percent, 1, " %")
    )?;
    writeln!(w, "  forecast     {}", r.weather_description)?;
    if !r.alerts.is_empty() {
        writeln!(w, "  alerts:")?;
        for a in &r.alerts {
            writeln!(w, "    - {a}")?;
        }
    }
    if !r.degraded.is_empty() {
        let names: Vec<_> = r.degraded.iter().map(|m| m.name()).collect();
        writeln!(w, "  degraded     {} (last valid reading reused)", names.join(", "))?;
    }
    writeln!(w, "  upload       {}", delivery_text(&o.delivery))
}

pub fn write_self_check<W: Write>(w: &mut W, samples: &[RawSample], json: bool) -> io::Result<()> {
    if json {
        let rows: Vec<_> = samples
            .iter()
            .map(|s| json!({ "metric": s.metric.name(), "value": s.reading.value() }))
            .collect();
        return writeln!(w, "{}", json!({ "self_check": rows }));
    }
    for s in samples {
        match s.reading {
            Reading::Valid(v) => writeln!(w, "{:<14} ok   {v:.2}", s.metric.name())?,
            Reading::Invalid => writeln!(w, "{:<14} FAIL", s.metric.name())?,
        }
    }
    Ok(())
}
