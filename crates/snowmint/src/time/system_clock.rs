use super::{SystemTime, TimeSource, UNIX_EPOCH};

/// The system wall clock.
///
/// Wall clocks can be stepped backwards (NTP corrections, manual changes).
/// The generator detects this and refuses to mint IDs until the clock catches
/// up, see [`crate::Error::ClockRegression`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SystemClock;

impl TimeSource for SystemClock {
    fn current_millis(&self) -> u64 {
        // A clock set before 1970 reads as zero, which any valid epoch rejects.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }
}
