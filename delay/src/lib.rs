//! Thread-safe, reconfigurable delays.
//!
//! A [`Delay`] holds a base duration that any thread may update with
//! [`Delay::set`], and a [`Generator`] that turns the base into the actual
//! wait time (fixed, uniform jitter or normal jitter). [`Delay::wait`] blocks
//! the calling thread through a [`Sleeper`].

pub mod config;
pub mod delay;
pub mod error;
pub mod generator;
pub mod sleeper;

pub use chrono::TimeDelta;
pub use config::DelayConfig;
pub use delay::{Delay, Pause};
pub use error::DelayError;
pub use generator::{FixedGenerator, Generator, NormalGenerator, RandomSource, UniformGenerator};
pub use sleeper::{shared_real_sleeper, RealSleeper, RecordingSleeper, Sleeper};
