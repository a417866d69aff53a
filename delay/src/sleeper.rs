use chrono::TimeDelta;
use once_cell::sync::Lazy;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::trace;

/// Blocking pause, abstracted so tests can observe it without waiting.
pub trait Sleeper: Send + Sync {
    /// Blocks for at least `d`. Zero or negative durations return immediately.
    fn sleep(&self, d: TimeDelta);
}

/// Sleeps the current thread with `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealSleeper;

impl Sleeper for RealSleeper {
    fn sleep(&self, d: TimeDelta) {
        // to_std fails for negative values
        match d.to_std() {
            Ok(std_d) if !std_d.is_zero() => std::thread::sleep(std_d),
            _ => trace!("skipping non-positive sleep of {}", d),
        }
    }
}

static SHARED_REAL_SLEEPER: Lazy<Arc<RealSleeper>> = Lazy::new(|| Arc::new(RealSleeper));

/// Process-wide real sleeper used by the convenience constructors.
pub fn shared_real_sleeper() -> Arc<dyn Sleeper> {
    (*SHARED_REAL_SLEEPER).clone()
}

/// Records every requested duration and returns immediately.
#[derive(Debug, Default)]
pub struct RecordingSleeper {
    calls: Mutex<Vec<TimeDelta>>,
}

impl RecordingSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<TimeDelta> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn last(&self) -> Option<TimeDelta> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).last().copied()
    }

    pub fn total(&self) -> TimeDelta {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .fold(TimeDelta::zero(), |acc, d| acc.checked_add(d).unwrap_or(TimeDelta::MAX))
    }
}

impl Sleeper for RecordingSleeper {
    fn sleep(&self, d: TimeDelta) {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).push(d);
    }
}
