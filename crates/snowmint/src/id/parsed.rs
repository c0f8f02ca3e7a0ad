use core::time::Duration;

use crate::{Result, SnowflakeId, time::SystemTime, time::UNIX_EPOCH};

/// The decoded fields of a [`SnowflakeId`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParsedSnowflake {
    /// Absolute generation time: `epoch + timestamp delta`.
    pub timestamp: SystemTime,
    pub node_id: u16,
    pub sequence: u16,
}

impl ParsedSnowflake {
    /// Milliseconds since the Unix epoch.
    pub fn unix_millis(&self) -> u64 {
        self.timestamp
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis() as u64)
    }

    /// The generation time as a UTC calendar value.
    ///
    /// Returns `None` when the instant is outside chrono's representable range.
    #[cfg_attr(docsrs, doc(cfg(feature = "chrono")))]
    #[cfg(feature = "chrono")]
    pub fn timestamp_utc(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        let millis = i64::try_from(self.unix_millis()).ok()?;
        chrono::DateTime::from_timestamp_millis(millis)
    }
}

impl SnowflakeId {
    /// Splits the ID into its fields, anchoring the timestamp at `epoch`
    /// (milliseconds since the Unix epoch).
    ///
    /// The epoch must be the one used at generation; the ID has no way to
    /// carry it. Any `u64` decodes, including values not minted by this
    /// scheme.
    ///
    /// ```
    /// use snowmint::{SnowflakeId, DEFAULT_EPOCH};
    ///
    /// let id = SnowflakeId::from_components(1_000, 3, 9);
    /// let parsed = id.decode(DEFAULT_EPOCH);
    /// assert_eq!(parsed.unix_millis(), DEFAULT_EPOCH + 1_000);
    /// assert_eq!((parsed.node_id, parsed.sequence), (3, 9));
    /// ```
    pub fn decode(&self, epoch: u64) -> ParsedSnowflake {
        let millis = epoch.saturating_add(self.timestamp());
        ParsedSnowflake {
            timestamp: UNIX_EPOCH + Duration::from_millis(millis),
            node_id: self.node_id(),
            sequence: self.sequence(),
        }
    }

    /// Parses the canonical decimal form and decodes it against `epoch`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::MalformedIdentifier`] if `input` is not an
    /// unsigned 64-bit decimal integer.
    pub fn parse(input: &str, epoch: u64) -> Result<ParsedSnowflake> {
        Ok(input.parse::<Self>()?.decode(epoch))
    }
}
