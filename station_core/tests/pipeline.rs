//! End-to-end cycle behaviour against scripted sensors and a recording link.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rstest::rstest;
use station_core::config::{CooldownMode, RetryPolicy, SamplingCfg};
use station_core::{Delivery, Station, StationCfg, StationError, UploadPayload};
use station_traits::clock::test_clock::TestClock;
use station_traits::{BoxError, Clock, Metric, SampleSource, Uploader};

/// Source driven by a closure of (metric, n-th read of that metric).
struct Scripted<F> {
    reads: HashMap<Metric, usize>,
    f: F,
}

impl<F> Scripted<F>
where
    F: FnMut(Metric, usize) -> Result<f64, BoxError>,
{
    fn new(f: F) -> Self {
        Self {
            reads: HashMap::new(),
            f,
        }
    }
}

impl<F> SampleSource for Scripted<F>
where
    F: FnMut(Metric, usize) -> Result<f64, BoxError>,
{
    fn read(&mut self, metric: Metric) -> Result<f64, BoxError> {
        let n = self.reads.entry(metric).or_insert(0);
        let i = *n;
        *n += 1;
        (self.f)(metric, i)
    }
}

fn nominal(metric: Metric) -> f64 {
    match metric {
        Metric::Temperature => 22.0,
        Metric::Humidity => 55.0,
        Metric::Pressure => 1012.0,
        Metric::SoilMoisture => 2100.0,
    }
}

/// Records every payload; fails the first `fail_first` sends.
#[derive(Clone, Default)]
struct Recorder {
    sent: Arc<Mutex<Vec<UploadPayload>>>,
    attempts: Arc<Mutex<u32>>,
    fail_first: u32,
    fail_msg: &'static str,
}

impl Recorder {
    fn failing(n: u32, msg: &'static str) -> Self {
        Self {
            fail_first: n,
            fail_msg: msg,
            ..Self::default()
        }
    }

    fn sent(&self) -> Vec<UploadPayload> {
        self.sent.lock().unwrap().clone()
    }
}

impl Uploader<UploadPayload> for Recorder {
    fn device_id(&self) -> String {
        "test-node".into()
    }

    fn send(&mut self, payload: &UploadPayload) -> Result<(), BoxError> {
        let mut attempts = self.attempts.lock().unwrap();
        *attempts += 1;
        if *attempts <= self.fail_first {
            return Err(self.fail_msg.into());
        }
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

fn cfg(sample_count: usize, interval: Duration) -> StationCfg {
    StationCfg {
        sampling: SamplingCfg {
            sample_count,
            interval,
            ..SamplingCfg::default()
        },
        retry: RetryPolicy {
            max_retries: 3,
            pause: Duration::from_secs(2),
        },
        cooldown: CooldownMode::Idle(Duration::ZERO),
        ..StationCfg::default()
    }
}

#[test]
fn nominal_cycle_uploads_once_with_wire_values() {
    let clock = TestClock::new();
    let link = Recorder::default();
    let mut station = Station::builder()
        .with_source(Scripted::new(|m, _| Ok(nominal(m))))
        .with_uploader(link.clone())
        .with_clock(clock.clone())
        .with_config(cfg(3, Duration::from_secs(5)))
        .build()
        .expect("build");

    let outcome = station.run_cycle().expect("cycle");
    assert!(matches!(outcome.delivery, Delivery::Delivered { attempts: 1 }));
    assert_eq!(outcome.invalid_samples, 0);
    assert!(outcome.report.degraded.is_empty());

    let sent = link.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].temperature, 22.0);
    assert_eq!(sent[0].pressure_trend, 0.0);
    assert_eq!(sent[0].device_id, "test-node");
    assert_eq!(sent[0].timestamp, clock.unix_secs());
}

#[test]
fn ticks_are_paced_by_the_interval_but_not_after_the_last() {
    let clock = TestClock::new();
    let mut station = Station::builder()
        .with_source(Scripted::new(|m, _| Ok(nominal(m))))
        .with_uploader(Recorder::default())
        .with_clock(clock.clone())
        .with_config(cfg(5, Duration::from_secs(5)))
        .build()
        .expect("build");

    station.run_cycle().expect("cycle");
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(5); 4]);
}

#[test]
fn failed_metric_reuses_previous_aggregate() {
    let mut station = Station::builder()
        .with_source(Scripted::new(|m, i| match m {
            // First cycle reads 0..4 are good, second cycle is out of range.
            Metric::Temperature if i < 4 => Ok(19.5),
            Metric::Temperature => Ok(200.0),
            other => Ok(nominal(other)),
        }))
        .with_uploader(Recorder::default())
        .with_clock(TestClock::new())
        .with_config(cfg(4, Duration::ZERO))
        .build()
        .expect("build");

    let first = station.run_cycle().expect("cycle 1");
    assert_eq!(first.report.temperature, 19.5);

    let second = station.run_cycle().expect("cycle 2");
    assert_eq!(second.report.temperature, 19.5);
    assert_eq!(second.report.degraded, vec![Metric::Temperature]);
    assert_eq!(second.invalid_samples, 4);
}

#[test]
fn first_cycle_without_readings_uses_configured_defaults() {
    let mut station = Station::builder()
        .with_source(Scripted::new(|_, _| Err::<f64, BoxError>("i2c nack".into())))
        .with_uploader(Recorder::default())
        .with_clock(TestClock::new())
        .with_config(cfg(2, Duration::ZERO))
        .build()
        .expect("build");

    let out = station.run_cycle().expect("cycle");
    let r = &out.report;
    assert_eq!(
        (r.temperature, r.humidity, r.pressure, r.soil_moisture),
        (25.0, 50.0, 1013.0, 2000.0)
    );
    assert_eq!(r.degraded, Metric::ALL.to_vec());
    assert_eq!(out.invalid_samples, 8);
}

#[test]
fn pressure_trend_spans_the_last_six_cycles() {
    let mut station = Station::builder()
        .with_source(Scripted::new(|m, i| match m {
            Metric::Pressure => Ok(1010.0 - i as f64),
            other => Ok(nominal(other)),
        }))
        .with_uploader(Recorder::default())
        .with_clock(TestClock::new())
        .with_config(cfg(1, Duration::ZERO))
        .build()
        .expect("build");

    let trends: Vec<f64> = (0..7)
        .map(|_| station.run_cycle().expect("cycle").report.pressure_trend)
        .collect();
    assert_eq!(trends, vec![0.0, -1.0, -2.0, -3.0, -4.0, -5.0, -5.0]);
    assert_eq!(station.state().pressure_history.len(), 6);
}

#[rstest]
#[case::refused("connection refused", false)]
#[case::timeout("operation timed out", true)]
fn upload_gives_up_after_bounded_retries(#[case] msg: &'static str, #[case] is_timeout: bool) {
    let clock = TestClock::new();
    let link = Recorder::failing(u32::MAX, msg);
    let mut station = Station::builder()
        .with_source(Scripted::new(|m, _| Ok(nominal(m))))
        .with_uploader(link.clone())
        .with_clock(clock.clone())
        .with_config(cfg(1, Duration::ZERO))
        .build()
        .expect("build");

    let out = station.run_cycle().expect("cycle survives upload failure");
    match out.delivery {
        Delivery::Failed {
            attempts,
            last_error,
        } => {
            assert_eq!(attempts, 4);
            assert_eq!(matches!(last_error, StationError::Timeout(_)), is_timeout);
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(clock.sleeps(), vec![Duration::from_secs(2); 3]);
    assert!(link.sent().is_empty());
}

#[test]
fn upload_recovers_within_retry_budget() {
    let clock = TestClock::new();
    let link = Recorder::failing(2, "503 service unavailable");
    let mut station = Station::builder()
        .with_source(Scripted::new(|m, _| Ok(nominal(m))))
        .with_uploader(link.clone())
        .with_clock(clock.clone())
        .with_config(cfg(1, Duration::ZERO))
        .build()
        .expect("build");

    let out = station.run_cycle().expect("cycle");
    assert!(matches!(out.delivery, Delivery::Delivered { attempts: 3 }));
    assert_eq!(link.sent().len(), 1);
    assert_eq!(clock.sleeps().len(), 2);
}

#[test]
fn disabled_upload_still_builds_the_report() {
    let link = Recorder::default();
    let mut station = Station::builder()
        .with_source(Scripted::new(|m, _| Ok(nominal(m))))
        .with_uploader(link.clone())
        .with_clock(TestClock::new())
        .with_config(cfg(1, Duration::ZERO))
        .upload_enabled(false)
        .build()
        .expect("build");

    let out = station.run_cycle().expect("cycle");
    assert!(matches!(out.delivery, Delivery::Skipped));
    assert!(link.sent().is_empty());
    assert!(!out.report.weather_description.is_empty());
}

#[test]
fn non_finite_fallback_abandons_cycle_before_touching_history() {
    let mut config = cfg(1, Duration::ZERO);
    config.fallbacks.pressure = f64::NAN;
    let mut station = Station::builder()
        .with_source(Scripted::new(|m, _| match m {
            Metric::Pressure => Err::<f64, BoxError>("bus error".into()),
            other => Ok(nominal(other)),
        }))
        .with_uploader(Recorder::default())
        .with_clock(TestClock::new())
        .with_config(config)
        .build()
        .expect("build");

    let err = station.run_cycle().expect_err("non-finite aggregate");
    assert!(matches!(
        err.downcast_ref::<StationError>(),
        Some(StationError::State(_))
    ));
    assert!(station.state().pressure_history.is_empty());
}

#[test]
fn self_check_reads_each_metric_once() {
    let mut station = Station::builder()
        .with_source(Scripted::new(|m, _| match m {
            Metric::Humidity => Ok(140.0),
            other => Ok(nominal(other)),
        }))
        .with_uploader(Recorder::default())
        .with_clock(TestClock::new())
        .build()
        .expect("build");

    let samples = station.self_check();
    let valid: Vec<_> = samples.iter().map(|s| s.reading.value().is_some()).collect();
    assert_eq!(valid, vec![true, false, true, true]);
    assert!(station.state().pressure_history.is_empty());
}
