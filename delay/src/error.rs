use chrono::TimeDelta;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DelayError {
    #[error("uniform spread must not be negative (got {0})")]
    NegativeSpread(TimeDelta),
    #[error("standard deviation must not be negative (got {0})")]
    NegativeStdDev(TimeDelta),
    /// The duration does not fit in signed 64-bit nanoseconds.
    #[error("{0} is out of the nanosecond range")]
    OutOfRange(TimeDelta),
    /// A millisecond count that `TimeDelta` cannot represent.
    #[error("{0}ms is out of the duration range")]
    MillisOutOfRange(i64),
}
