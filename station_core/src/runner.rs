//! Cycle loop: run cycles until stopped, isolate faults, cool down between.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel as xch;
use station_traits::clock::Clock;
use station_traits::{SampleSource, Uploader};

use crate::report::UploadPayload;
use crate::station::{CycleOutcome, Station};
use crate::upload::Delivery;

/// Cooperative stop request shared between the loop and a signal handler.
///
/// Raising it never interrupts a running cycle; it is observed between
/// cycles and cuts an idle cooldown short.
#[derive(Debug, Clone)]
pub struct StopSignal {
    flag: Arc<AtomicBool>,
    tx: xch::Sender<()>,
    rx: xch::Receiver<()>,
}

impl Default for StopSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl StopSignal {
    pub fn new() -> Self {
        let (tx, rx) = xch::bounded(1);
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            tx,
            rx,
        }
    }

    pub fn trigger(&self) {
        self.flag.store(true, Ordering::Relaxed);
        // A full channel already holds a wake-up.
        let _ = self.tx.try_send(());
    }

    pub fn is_stopped(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    /// Block for up to `d`. Returns true if stop was raised.
    pub fn wait(&self, d: Duration) -> bool {
        if self.is_stopped() {
            return true;
        }
        if d.is_zero() {
            return false;
        }
        match self.rx.recv_timeout(d) {
            Ok(()) => true,
            Err(_) => self.is_stopped(),
        }
    }
}

/// Tally of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub cycles: u64,
    pub delivered: u64,
    pub upload_failed: u64,
    pub skipped_upload: u64,
    /// Cycles abandoned by an error or panic.
    pub faulted: u64,
}

fn panic_message(p: &(dyn Any + Send)) -> String {
    if let Some(s) = p.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = p.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Run cycles until `stop` is raised or `max_cycles` have run.
///
/// Errors and panics inside a cycle abandon that cycle only; the loop
/// continues after the normal cooldown. No cooldown follows the final
/// cycle of a bounded run.
pub fn run<S, U, C>(
    station: &mut Station<S, U, C>,
    stop: &StopSignal,
    max_cycles: Option<u64>,
    mut on_cycle: impl FnMut(&CycleOutcome),
) -> RunSummary
where
    S: SampleSource,
    U: Uploader<UploadPayload>,
    C: Clock,
{
    let mut summary = RunSummary::default();
    loop {
        if stop.is_stopped() {
            tracing::info!("stop requested");
            break;
        }

        summary.cycles += 1;
        let span = tracing::info_span!("cycle", n = summary.cycles);
        let entered = span.enter();
        match panic::catch_unwind(AssertUnwindSafe(|| station.run_cycle())) {
            Ok(Ok(outcome)) => {
                match &outcome.delivery {
                    Delivery::Delivered { .. } => summary.delivered += 1,
                    Delivery::Failed { .. } => summary.upload_failed += 1,
                    Delivery::Skipped => summary.skipped_upload += 1,
                }
                on_cycle(&outcome);
            }
            Ok(Err(e)) => {
                summary.faulted += 1;
                tracing::error!(error = %e, "cycle abandoned");
            }
            Err(p) => {
                summary.faulted += 1;
                tracing::error!(panic = %panic_message(p.as_ref()), "cycle panicked, abandoned");
            }
        }
        drop(entered);

        if max_cycles.is_some_and(|max| summary.cycles >= max) {
            break;
        }
        station.cool_down(stop);
    }
    tracing::info!(
        cycles = summary.cycles,
        delivered = summary.delivered,
        upload_failed = summary.upload_failed,
        faulted = summary.faulted,
        "station stopped"
    );
    summary
}
