use crate::error::DelayError;
use crate::generator::{FixedGenerator, Generator, NormalGenerator, RandomSource, UniformGenerator};
use crate::sleeper::{shared_real_sleeper, Sleeper};
use chrono::TimeDelta;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, trace};

/// The operations components need from a delay, so they can hold any
/// implementation behind `Arc<dyn Pause>`.
pub trait Pause: Send + Sync {
    fn set(&self, base: TimeDelta) -> TimeDelta;
    fn get(&self) -> TimeDelta;
    fn next_wait_time(&self) -> TimeDelta;
    fn wait(&self);
}

/// A pause whose base duration can be changed at runtime from any thread.
///
/// The base is the only mutable state and lives behind a reader/writer lock.
/// The sleeper and generator are fixed at construction. Share a `Delay`
/// between threads with an `Arc`.
pub struct Delay {
    base: RwLock<TimeDelta>,
    sleeper: Arc<dyn Sleeper>,
    generator: Box<dyn Generator>,
}

impl Delay {
    pub fn new(base: TimeDelta, sleeper: Arc<dyn Sleeper>, generator: impl Generator + 'static) -> Self {
        Self { base: RwLock::new(base), sleeper, generator: Box::new(generator) }
    }

    /// Always waits exactly the base duration.
    pub fn fixed(base: TimeDelta) -> Self {
        debug!("fixed delay of {}", base);
        Self::new(base, shared_real_sleeper(), FixedGenerator)
    }

    /// Waits `base + U`, `U` uniform in `[0, spread)`.
    ///
    /// `set` only moves the lower bound; the spread stays as given here.
    pub fn variable_uniform<R>(base: TimeDelta, spread: TimeDelta, rng: R) -> Result<Self, DelayError>
    where
        R: RandomSource + 'static,
    {
        let generator = UniformGenerator::new(spread, rng)?;
        debug!("uniform delay of {} spread {}", base, spread);
        Ok(Self::new(base, shared_real_sleeper(), generator))
    }

    /// Waits `base + σ·z`, `z` standard normal.
    ///
    /// `set` only moves the mean; the standard deviation stays as given here.
    pub fn variable_normal<R>(base: TimeDelta, std_dev: TimeDelta, rng: R) -> Result<Self, DelayError>
    where
        R: RandomSource + 'static,
    {
        let generator = NormalGenerator::new(std_dev, rng)?;
        debug!("normal delay of {} std dev {}", base, std_dev);
        Ok(Self::new(base, shared_real_sleeper(), generator))
    }

    pub fn sleeper(&self) -> &Arc<dyn Sleeper> {
        &self.sleeper
    }

    /// Replaces the base duration and returns the one it replaced.
    pub fn set(&self, base: TimeDelta) -> TimeDelta {
        let mut guard = self.base.write().unwrap_or_else(PoisonError::into_inner);
        let prev = std::mem::replace(&mut *guard, base);
        drop(guard);
        debug!("delay base {} -> {}", prev, base);
        prev
    }

    pub fn get(&self) -> TimeDelta {
        *self.base.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Draws the next wait time without sleeping.
    pub fn next_wait_time(&self) -> TimeDelta {
        let base = self.base.read().unwrap_or_else(PoisonError::into_inner);
        let next = self.generator.next_wait_time(*base);
        trace!("next wait time {} from base {}", next, *base);
        next
    }

    /// Sleeps for the next wait time. The lock is released before sleeping,
    /// so `set` and `get` never wait on a sleeping thread.
    pub fn wait(&self) {
        let d = self.next_wait_time();
        self.sleeper.sleep(d);
    }
}

impl Pause for Delay {
    fn set(&self, base: TimeDelta) -> TimeDelta {
        Delay::set(self, base)
    }

    fn get(&self) -> TimeDelta {
        Delay::get(self)
    }

    fn next_wait_time(&self) -> TimeDelta {
        Delay::next_wait_time(self)
    }

    fn wait(&self) {
        Delay::wait(self)
    }
}

impl fmt::Debug for Delay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delay").field("base", &self.get()).finish_non_exhaustive()
    }
}
