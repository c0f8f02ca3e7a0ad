use core::{future::Future, time::Duration};

use super::SleepProvider;
use crate::{Poll, Result, SnowflakeGenerator, SnowflakeId, SnowflakeOptions, TimeSource};

/// Extension trait for asynchronously generating Snowflake IDs.
///
/// Instead of parking the thread while the current millisecond's sequence is
/// exhausted, the returned future polls the generator and sleeps through the
/// given [`SleepProvider`] between attempts. The generator lock is never held
/// across an await point.
pub trait SnowflakeGeneratorAsyncExt {
    /// Returns a future that resolves to the next available Snowflake ID.
    ///
    /// # Errors
    ///
    /// Resolves to the same errors as [`SnowflakeGenerator::try_poll_id`].
    fn try_next_id_async<S>(
        &self,
        options: &SnowflakeOptions,
    ) -> impl Future<Output = Result<SnowflakeId>>
    where
        S: SleepProvider;
}

impl<T> SnowflakeGeneratorAsyncExt for SnowflakeGenerator<T>
where
    T: TimeSource + Sync,
{
    fn try_next_id_async<S>(
        &self,
        options: &SnowflakeOptions,
    ) -> impl Future<Output = Result<SnowflakeId>>
    where
        S: SleepProvider,
    {
        async move {
            loop {
                let dur = match self.try_poll_id(options)? {
                    Poll::Ready { id } => return Ok(id),
                    Poll::Pending { yield_until } => {
                        let now = self.time.current_millis();
                        Duration::from_millis(yield_until.saturating_sub(now).max(1))
                    }
                };
                S::sleep_for(dur).await;
            }
        }
    }
}
