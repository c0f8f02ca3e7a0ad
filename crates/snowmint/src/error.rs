/// A result type defaulting to the crate-wide [`Error`].
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// All errors that `snowmint` can produce.
///
/// Configuration errors are raised before the generator state is touched.
/// None of these are retried internally; retry policy belongs to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Hash, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// The node id lies outside `0..=1023`.
    #[error("node id must be between 0 and 1023, got {node_id}")]
    InvalidNodeId { node_id: i64 },

    /// The epoch is negative or later than the current time.
    #[error("epoch must be a valid timestamp not in the future, got {epoch} (now {now})")]
    InvalidEpoch { epoch: i64, now: u64 },

    /// The explicit initial sequence lies outside `0..=4095`.
    #[error("sequence must be between 0 and 4095, got {sequence}")]
    InvalidSequence { sequence: i64 },

    /// The clock reads earlier than the last timestamp used for generation.
    #[error("clock moved backwards: last {last} ms, now {now} ms; refusing to generate id")]
    ClockRegression { last: u64, now: u64 },

    /// The elapsed time since the epoch no longer fits the 41-bit field.
    #[error("timestamp delta {delta} ms exceeds the 41-bit timestamp field")]
    TimestampOverflow { delta: u64 },

    /// The decoder input is not an unsigned 64-bit decimal integer.
    #[error("malformed snowflake id {input:?}")]
    MalformedIdentifier { input: String },

    /// A thread panicked while holding the generator lock.
    ///
    /// Only produced by the std mutex; `parking_lot` mutexes do not poison.
    #[cfg_attr(docsrs, doc(cfg(not(feature = "parking-lot"))))]
    #[cfg(not(feature = "parking-lot"))]
    #[error("generator lock poisoned")]
    LockPoisoned,
}

#[cfg(not(feature = "parking-lot"))]
use crate::generator::{MutexGuard, PoisonError};
#[cfg(not(feature = "parking-lot"))]
impl<T> From<PoisonError<MutexGuard<'_, T>>> for Error {
    fn from(_: PoisonError<MutexGuard<'_, T>>) -> Self {
        Self::LockPoisoned
    }
}
