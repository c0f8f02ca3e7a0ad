use crate::{DEFAULT_EPOCH, Error, Result, SnowflakeId};

/// Default node id used when none is configured.
pub const DEFAULT_NODE_ID: u16 = 1;

/// Call-time configuration for [`SnowflakeGenerator::next_id`].
///
/// Every field is optional and defaulted independently. `epoch` and `node_id`
/// are signed so that negative input coming from loosely typed callers (JSON,
/// FFI) is representable and rejected with a precise error instead of
/// wrapping.
///
/// With the `serde` feature this deserializes from
/// `{ "epoch": .., "nodeId": .., "sequence": .. }`.
///
/// [`SnowflakeGenerator::next_id`]: crate::SnowflakeGenerator::next_id
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, rename_all = "camelCase")
)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SnowflakeOptions {
    /// Milliseconds since the Unix epoch. Defaults to [`DEFAULT_EPOCH`].
    pub epoch: Option<i64>,
    /// Node id in `0..=1023`. Defaults to [`DEFAULT_NODE_ID`].
    pub node_id: Option<i64>,
    /// Initial sequence in `0..=4095` used when a new millisecond starts.
    pub sequence: Option<i64>,
}

/// [`SnowflakeOptions`] after validation against a clock reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidatedOptions {
    pub epoch: u64,
    pub node_id: u16,
    pub sequence: Option<u16>,
}

impl SnowflakeOptions {
    pub const fn with_epoch(mut self, epoch: i64) -> Self {
        self.epoch = Some(epoch);
        self
    }

    pub const fn with_node_id(mut self, node_id: i64) -> Self {
        self.node_id = Some(node_id);
        self
    }

    pub const fn with_sequence(mut self, sequence: i64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Checks every field and applies defaults.
    ///
    /// `now` is the current time in milliseconds since the Unix epoch; the
    /// epoch may not lie after it.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidNodeId`] if the node id is outside `0..=1023`
    /// - [`Error::InvalidEpoch`] if the epoch is negative or after `now`
    /// - [`Error::InvalidSequence`] if the sequence is outside `0..=4095`
    pub fn validate(&self, now: u64) -> Result<ValidatedOptions> {
        let node_id = match self.node_id {
            None => DEFAULT_NODE_ID,
            Some(node_id) => u16::try_from(node_id)
                .ok()
                .filter(|n| *n <= SnowflakeId::MAX_NODE_ID)
                .ok_or(Error::InvalidNodeId { node_id })?,
        };

        let requested = self.epoch.unwrap_or(DEFAULT_EPOCH as i64);
        let epoch = u64::try_from(requested)
            .ok()
            .filter(|e| *e <= now)
            .ok_or(Error::InvalidEpoch {
                epoch: requested,
                now,
            })?;

        let sequence = match self.sequence {
            None => None,
            Some(sequence) => Some(
                u16::try_from(sequence)
                    .ok()
                    .filter(|s| *s <= SnowflakeId::MAX_SEQUENCE)
                    .ok_or(Error::InvalidSequence { sequence })?,
            ),
        };

        Ok(ValidatedOptions {
            epoch,
            node_id,
            sequence,
        })
    }
}
