use core::{cmp::Ordering, time::Duration};

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{
    Error, Result, SnowflakeId,
    generator::{Mutex, MutexGuard, Poll, SnowflakeOptions, ValidatedOptions},
    time::TimeSource,
};

/// How long a caller parks between clock samples while waiting for the next
/// millisecond.
const WAIT_POLL_INTERVAL: Duration = Duration::from_micros(100);

/// The mutable part of a generator: the last millisecond an ID was minted in
/// and the sequence handed out at that millisecond.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct GeneratorState {
    /// Milliseconds since the Unix epoch.
    pub last_timestamp: u64,
    pub sequence: u16,
}

enum Advance {
    Ready { timestamp: u64, sequence: u16 },
    Exhausted,
}

impl GeneratorState {
    fn advance(&self, now: u64, initial: Option<u16>) -> Result<Advance> {
        match now.cmp(&self.last_timestamp) {
            Ordering::Equal => {
                // An explicit initial sequence only ever raises the base, so
                // the same millisecond can never hand out a value twice.
                let base = initial.map_or(self.sequence, |s| s.max(self.sequence));
                let next = base.wrapping_add(1) & SnowflakeId::MAX_SEQUENCE;
                if next == 0 {
                    Ok(Advance::Exhausted)
                } else {
                    Ok(Advance::Ready {
                        timestamp: now,
                        sequence: next,
                    })
                }
            }
            Ordering::Greater => Ok(Advance::Ready {
                timestamp: now,
                sequence: initial.unwrap_or(0),
            }),
            Ordering::Less => Err(cold_clock_behind(self.last_timestamp, now)),
        }
    }
}

#[cold]
#[inline(never)]
fn cold_clock_behind(last: u64, now: u64) -> Error {
    #[cfg(feature = "tracing")]
    tracing::warn!(last, now, "clock moved backwards; refusing to generate id");
    Error::ClockRegression { last, now }
}

/// A lock-based Snowflake ID generator suitable for multi-threaded
/// environments.
///
/// The last timestamp and sequence live behind a single [`Mutex`], so the
/// read-compare-write of every generation step is atomic with respect to
/// other callers. Share one generator between threads with a reference or an
/// [`Arc`](std::sync::Arc); independent generators share nothing and never
/// contend.
///
/// Options are supplied per call. IDs are strictly increasing across calls
/// that use the same options.
///
/// # Example
///
/// ```
/// use snowmint::{SnowflakeGenerator, SnowflakeOptions, SystemClock};
///
/// let generator = SnowflakeGenerator::new(SystemClock);
/// let options = SnowflakeOptions::default().with_node_id(3);
///
/// let a = generator.next_id(&options).unwrap();
/// let b = generator.next_id(&options).unwrap();
/// assert!(b > a);
/// assert_eq!(b.node_id(), 3);
/// ```
#[derive(Debug)]
pub struct SnowflakeGenerator<T>
where
    T: TimeSource,
{
    pub(crate) state: Mutex<GeneratorState>,
    pub(crate) time: T,
}

impl<T> SnowflakeGenerator<T>
where
    T: TimeSource,
{
    /// Creates a generator with empty state reading time from `time`.
    pub fn new(time: T) -> Self {
        Self::from_state(GeneratorState::default(), time)
    }

    /// Creates a generator preloaded with `state`.
    ///
    /// Useful for tests or to continue after a known last timestamp; in
    /// typical use prefer [`Self::new`].
    pub fn from_state(state: GeneratorState, time: T) -> Self {
        Self {
            state: Mutex::new(state),
            time,
        }
    }

    /// Returns a copy of the current state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LockPoisoned`] if the lock is poisoned.
    pub fn state(&self) -> Result<GeneratorState> {
        Ok(*self.lock()?)
    }

    /// Generates the next ID, blocking if the current millisecond's sequence
    /// is exhausted.
    ///
    /// The clock is sampled once with the generator lock held, so a reading
    /// can never be older than a timestamp another caller already stored.
    /// The wait also holds the lock and re-samples the clock every 100µs
    /// until it moves past the exhausted millisecond, then mints the ID with
    /// sequence 0.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidNodeId`], [`Error::InvalidEpoch`] or
    ///   [`Error::InvalidSequence`] for bad options, before any state change
    /// - [`Error::ClockRegression`] if the clock reads earlier than the last
    ///   generation; the state is left untouched
    /// - [`Error::TimestampOverflow`] if the time since the epoch does not
    ///   fit 41 bits
    /// - [`Error::LockPoisoned`] if the lock is poisoned
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), err))]
    pub fn next_id(&self, options: &SnowflakeOptions) -> Result<SnowflakeId> {
        let mut state = self.lock()?;
        let now = self.time.current_millis();
        let options = options.validate(now)?;

        let (timestamp, sequence) = match state.advance(now, options.sequence)? {
            Advance::Ready {
                timestamp,
                sequence,
            } => (timestamp, sequence),
            Advance::Exhausted => (self.wait_next_millis(state.last_timestamp), 0),
        };

        let id = compose(timestamp, sequence, &options)?;
        *state = GeneratorState {
            last_timestamp: timestamp,
            sequence,
        };
        Ok(id)
    }

    /// Attempts to generate the next ID without blocking.
    ///
    /// Behaves like [`Self::next_id`] except that an exhausted sequence
    /// returns [`Poll::Pending`] and leaves the state untouched. A later call
    /// in a new millisecond starts from the initial sequence again.
    ///
    /// # Errors
    ///
    /// Same as [`Self::next_id`].
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self), err))]
    pub fn try_poll_id(&self, options: &SnowflakeOptions) -> Result<Poll> {
        let mut state = self.lock()?;
        let now = self.time.current_millis();
        let options = options.validate(now)?;

        match state.advance(now, options.sequence)? {
            Advance::Ready {
                timestamp,
                sequence,
            } => {
                let id = compose(timestamp, sequence, &options)?;
                *state = GeneratorState {
                    last_timestamp: timestamp,
                    sequence,
                };
                Ok(Poll::Ready { id })
            }
            Advance::Exhausted => Ok(Poll::Pending {
                yield_until: state.last_timestamp + 1,
            }),
        }
    }

    fn wait_next_millis(&self, last: u64) -> u64 {
        #[cfg(feature = "tracing")]
        tracing::debug!(last, "sequence exhausted; waiting for next millisecond");
        loop {
            std::thread::sleep(WAIT_POLL_INTERVAL);
            let now = self.time.current_millis();
            if now > last {
                return now;
            }
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, GeneratorState>> {
        #[cfg(feature = "parking-lot")]
        {
            Ok(self.state.lock())
        }
        #[cfg(not(feature = "parking-lot"))]
        {
            Ok(self.state.lock()?)
        }
    }
}

fn compose(timestamp: u64, sequence: u16, options: &ValidatedOptions) -> Result<SnowflakeId> {
    let delta = timestamp - options.epoch;
    if delta > SnowflakeId::TIMESTAMP_MASK {
        return Err(Error::TimestampOverflow { delta });
    }
    Ok(SnowflakeId::from_components(
        delta,
        options.node_id,
        sequence,
    ))
}
