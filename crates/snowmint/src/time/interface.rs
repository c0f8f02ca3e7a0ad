/// Default epoch: Friday, January 1, 2021 00:00:00 UTC, in milliseconds since
/// the Unix epoch.
pub const DEFAULT_EPOCH: u64 = 1_609_459_200_000;

/// A trait for wall-clock sources.
///
/// This abstraction lets the generator run against the real system clock or a
/// mocked clock in tests. Unlike the epoch-relative timestamps stored in IDs,
/// the value here is **milliseconds since the Unix epoch**; the generator
/// subtracts the configured epoch itself.
///
/// # Example
///
/// ```
/// use snowmint::TimeSource;
///
/// struct FixedTime;
/// impl TimeSource for FixedTime {
///     fn current_millis(&self) -> u64 {
///         1234
///     }
/// }
///
/// let time = FixedTime;
/// assert_eq!(time.current_millis(), 1234);
/// ```
pub trait TimeSource {
    /// Returns the current time in milliseconds since the Unix epoch.
    fn current_millis(&self) -> u64;
}

impl<T: TimeSource + ?Sized> TimeSource for &T {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}

impl<T: TimeSource + ?Sized> TimeSource for std::sync::Arc<T> {
    fn current_millis(&self) -> u64 {
        (**self).current_millis()
    }
}
