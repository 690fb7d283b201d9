//! Rolling pressure history and trend.

use std::collections::VecDeque;

/// Slots in the pressure window. Fixed; does not adapt to cycle cadence.
pub const HISTORY_CAPACITY: usize = 6;

/// Bounded FIFO of per-cycle pressure aggregates (hPa), oldest first.
#[derive(Debug, Clone, Default)]
pub struct PressureHistory {
    buf: VecDeque<f64>,
}

impl PressureHistory {
    pub fn new() -> Self {
        Self {
            buf: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    /// Append, evicting the oldest entry once full.
    pub fn push(&mut self, hpa: f64) {
        if self.buf.len() == HISTORY_CAPACITY {
            self.buf.pop_front();
        }
        self.buf.push_back(hpa);
    }

    /// Newest minus oldest; 0.0 until two entries exist.
    pub fn trend(&self) -> f64 {
        match (self.buf.front(), self.buf.back()) {
            (Some(first), Some(last)) if self.buf.len() >= 2 => last - first,
            _ => 0.0,
        }
    }

    /// Push and return the updated trend.
    pub fn record(&mut self, hpa: f64) -> f64 {
        self.push(hpa);
        self.trend()
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.buf.iter().copied()
    }
}
