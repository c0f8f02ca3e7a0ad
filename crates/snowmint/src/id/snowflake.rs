use core::{fmt, str::FromStr};

use crate::{Error, Result};

/// A 64-bit Snowflake ID.
///
/// - 1 bit reserved (always zero for generated IDs)
/// - 41 bits timestamp (ms since the generation epoch)
/// - 10 bits node ID
/// - 12 bits sequence
///
/// ```text
///  Bit Index:  63           63 62            22 21          12 11             0
///              +--------------+----------------+--------------+---------------+
///  Field:      | reserved (1) | timestamp (41) | node id (10) | sequence (12) |
///              +--------------+----------------+--------------+---------------+
///              |<----------- MSB ---------- 64 bits ---------- LSB ---------->|
/// ```
///
/// The epoch is not stored in the ID. Decoding to an absolute time requires
/// the same epoch that was used at generation, see [`SnowflakeId::decode`].
///
/// `Display` and [`FromStr`] use the canonical decimal form:
///
/// ```
/// use snowmint::SnowflakeId;
///
/// let id = SnowflakeId::from_components(1000, 2, 1);
/// let text = id.to_string();
/// assert_eq!(text, "4194312193");
/// assert_eq!(text.parse::<SnowflakeId>().unwrap(), id);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SnowflakeId {
    id: u64,
}

impl SnowflakeId {
    /// Bitmask for the 41-bit timestamp field once shifted down.
    pub const TIMESTAMP_MASK: u64 = (1 << 41) - 1;

    /// Bitmask for the 10-bit node ID field once shifted down.
    pub const NODE_ID_MASK: u64 = (1 << 10) - 1;

    /// Bitmask for the 12-bit sequence field.
    pub const SEQUENCE_MASK: u64 = (1 << 12) - 1;

    /// Position of the timestamp field (bits 22 through 62).
    pub const TIMESTAMP_SHIFT: u32 = 22;

    /// Position of the node ID field (bits 12 through 21).
    pub const NODE_ID_SHIFT: u32 = 12;

    /// Largest valid node ID.
    pub const MAX_NODE_ID: u16 = Self::NODE_ID_MASK as u16;

    /// Largest valid sequence value.
    pub const MAX_SEQUENCE: u16 = Self::SEQUENCE_MASK as u16;

    /// Packs the three fields into an ID, masking each to its width.
    pub const fn from_components(timestamp: u64, node_id: u16, sequence: u16) -> Self {
        let timestamp = (timestamp & Self::TIMESTAMP_MASK) << Self::TIMESTAMP_SHIFT;
        let node_id = (node_id as u64 & Self::NODE_ID_MASK) << Self::NODE_ID_SHIFT;
        let sequence = sequence as u64 & Self::SEQUENCE_MASK;
        Self {
            id: timestamp | node_id | sequence,
        }
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Milliseconds elapsed since the generation epoch.
    ///
    /// This is a plain shift with no mask: a value that was not produced by a
    /// generator may set the reserved bit, which then shows up here.
    pub const fn timestamp(&self) -> u64 {
        self.id >> Self::TIMESTAMP_SHIFT
    }

    pub const fn node_id(&self) -> u16 {
        ((self.id >> Self::NODE_ID_SHIFT) & Self::NODE_ID_MASK) as u16
    }

    pub const fn sequence(&self) -> u16 {
        (self.id & Self::SEQUENCE_MASK) as u16
    }

    /// Returns true if the reserved high bit is clear.
    pub const fn is_valid(&self) -> bool {
        self.id >> 63 == 0
    }

    /// Returns the ID as a zero-padded 20-digit string, which sorts
    /// lexicographically in the same order as the numeric value.
    pub fn to_padded_string(&self) -> String {
        format!("{:020}", self.id)
    }
}

impl From<u64> for SnowflakeId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<SnowflakeId> for u64 {
    fn from(id: SnowflakeId) -> Self {
        id.to_raw()
    }
}

impl FromStr for SnowflakeId {
    type Err = Error;

    /// Parses the canonical decimal form. Surrounding whitespace is ignored;
    /// signs, radix prefixes and values wider than 64 bits are rejected.
    fn from_str(s: &str) -> Result<Self> {
        let digits = s.trim();
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::MalformedIdentifier {
                input: s.to_owned(),
            });
        }
        digits
            .parse::<u64>()
            .map(Self::from_raw)
            .map_err(|_| Error::MalformedIdentifier {
                input: s.to_owned(),
            })
    }
}

impl fmt::Display for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for SnowflakeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "SnowflakeId {{ id: {} ({:#018x}) }}", self.id, self.id)?;
        writeln!(f, "  reserved  (1 bit):   {}", self.id >> 63)?;
        writeln!(
            f,
            "  timestamp (41 bits): {}",
            self.timestamp() & Self::TIMESTAMP_MASK
        )?;
        writeln!(f, "  node_id   (10 bits): {}", self.node_id())?;
        write!(f, "  sequence  (12 bits): {}", self.sequence())
    }
}
