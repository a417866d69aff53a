use crate::error::DelayError;
use chrono::TimeDelta;
use rand::{Rng, RngCore};
use rand_distr::StandardNormal;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Maps the current base duration of a delay to the time actually waited.
pub trait Generator: Send + Sync {
    fn next_wait_time(&self, base: TimeDelta) -> TimeDelta;
}

impl<G: Generator + ?Sized> Generator for Arc<G> {
    fn next_wait_time(&self, base: TimeDelta) -> TimeDelta {
        (**self).next_wait_time(base)
    }
}

impl<G: Generator + ?Sized> Generator for Box<G> {
    fn next_wait_time(&self, base: TimeDelta) -> TimeDelta {
        (**self).next_wait_time(base)
    }
}

/// Source of the draws used by the randomized generators.
///
/// Every `rand` generator is a `RandomSource`, so a seeded
/// `StdRng::seed_from_u64(..)` gives reproducible wait times.
pub trait RandomSource: Send {
    /// A draw from the uniform distribution over `[0, 1)`.
    fn uniform(&mut self) -> f64;
    /// A draw from the normal distribution with mean 0 and deviation 1.
    fn standard_normal(&mut self) -> f64;
}

impl<R: RngCore + Send> RandomSource for R {
    fn uniform(&mut self) -> f64 {
        self.gen::<f64>()
    }

    fn standard_normal(&mut self) -> f64 {
        self.sample::<f64, _>(StandardNormal)
    }
}

/// Waits exactly the base duration.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedGenerator;

impl Generator for FixedGenerator {
    fn next_wait_time(&self, base: TimeDelta) -> TimeDelta {
        base
    }
}

/// Adds a uniform offset in `[0, spread)` to the base.
pub struct UniformGenerator<R> {
    spread: TimeDelta,
    spread_ns: i64,
    rng: Mutex<R>,
}

impl<R: RandomSource> UniformGenerator<R> {
    pub fn new(spread: TimeDelta, rng: R) -> Result<Self, DelayError> {
        if spread < TimeDelta::zero() {
            return Err(DelayError::NegativeSpread(spread));
        }
        let spread_ns = nanos(spread)?;
        Ok(Self { spread, spread_ns, rng: Mutex::new(rng) })
    }

    pub fn spread(&self) -> TimeDelta {
        self.spread
    }
}

impl<R: RandomSource> Generator for UniformGenerator<R> {
    fn next_wait_time(&self, base: TimeDelta) -> TimeDelta {
        let r = self.rng.lock().unwrap_or_else(PoisonError::into_inner).uniform();
        // float rounding near the top of large spreads must not reach `spread`
        let upper = (self.spread_ns - 1).max(0);
        let offset = ((self.spread_ns as f64 * r).floor() as i64).clamp(0, upper);
        add_nanos(base, offset)
    }
}

impl<R> fmt::Debug for UniformGenerator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UniformGenerator").field("spread", &self.spread).finish_non_exhaustive()
    }
}

/// Adds a normally distributed offset with mean 0 to the base.
///
/// The result can be shorter than the base, and negative for small bases.
pub struct NormalGenerator<R> {
    std_dev: TimeDelta,
    std_dev_ns: i64,
    rng: Mutex<R>,
}

impl<R: RandomSource> NormalGenerator<R> {
    pub fn new(std_dev: TimeDelta, rng: R) -> Result<Self, DelayError> {
        if std_dev < TimeDelta::zero() {
            return Err(DelayError::NegativeStdDev(std_dev));
        }
        let std_dev_ns = nanos(std_dev)?;
        Ok(Self { std_dev, std_dev_ns, rng: Mutex::new(rng) })
    }

    pub fn std_dev(&self) -> TimeDelta {
        self.std_dev
    }
}

impl<R: RandomSource> Generator for NormalGenerator<R> {
    fn next_wait_time(&self, base: TimeDelta) -> TimeDelta {
        let z = self.rng.lock().unwrap_or_else(PoisonError::into_inner).standard_normal();
        add_nanos(base, (self.std_dev_ns as f64 * z) as i64)
    }
}

impl<R> fmt::Debug for NormalGenerator<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NormalGenerator").field("std_dev", &self.std_dev).finish_non_exhaustive()
    }
}

fn nanos(d: TimeDelta) -> Result<i64, DelayError> {
    d.num_nanoseconds().ok_or(DelayError::OutOfRange(d))
}

// Saturates at the TimeDelta bounds instead of overflowing.
fn add_nanos(base: TimeDelta, offset: i64) -> TimeDelta {
    base.checked_add(&TimeDelta::nanoseconds(offset)).unwrap_or(if offset < 0 {
        TimeDelta::MIN
    } else {
        TimeDelta::MAX
    })
}
