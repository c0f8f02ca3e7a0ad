use crate::SnowflakeId;

/// The outcome of a non-blocking generation attempt.
///
/// - [`Poll::Ready`] carries a freshly minted ID.
/// - [`Poll::Pending`] means the 4096 sequence values of the current
///   millisecond are used up; try again once the clock reaches
///   `yield_until`.
///
/// # Example
///
/// ```
/// use snowmint::{Poll, SnowflakeGenerator, SnowflakeOptions, SystemClock};
///
/// let generator = SnowflakeGenerator::new(SystemClock);
/// let options = SnowflakeOptions::default();
/// let id = loop {
///     match generator.try_poll_id(&options).unwrap() {
///         Poll::Ready { id } => break id,
///         Poll::Pending { .. } => std::thread::yield_now(),
///     }
/// };
/// assert!(id.is_valid());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Poll {
    /// A unique ID was generated and is ready to use.
    Ready {
        /// The generated ID.
        id: SnowflakeId,
    },
    /// The sequence is exhausted for the current millisecond.
    Pending {
        /// The Unix millisecond (inclusive) from which generation can resume.
        yield_until: u64,
    },
}
