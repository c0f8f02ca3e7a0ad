//! Process-wide default generator and string entry points.

use std::sync::OnceLock;

use crate::{
    DEFAULT_EPOCH, DEFAULT_NODE_ID, ParsedSnowflake, Result, SnowflakeGenerator, SnowflakeId,
    SnowflakeOptions, SystemClock,
};

const NODE_COUNT: usize = SnowflakeId::MAX_NODE_ID as usize + 1;

/// One lazily created generator per node id.
static GENERATORS: [OnceLock<SnowflakeGenerator<SystemClock>>; NODE_COUNT] =
    [const { OnceLock::new() }; NODE_COUNT];

/// Returns the process-wide generator for the node id in `options`.
///
/// Out-of-range node ids map to slot 0; the generator rejects them during
/// validation without touching its state.
fn global_generator(options: &SnowflakeOptions) -> &'static SnowflakeGenerator<SystemClock> {
    let slot = options
        .node_id
        .map_or(Some(usize::from(DEFAULT_NODE_ID)), |n| usize::try_from(n).ok())
        .filter(|n| *n < NODE_COUNT)
        .unwrap_or(0);
    GENERATORS[slot].get_or_init(|| SnowflakeGenerator::new(SystemClock))
}

/// Generates a Snowflake ID with the process-wide generator and returns it in
/// its canonical decimal form.
///
/// Each node id has its own last-timestamp/sequence state, so IDs are ordered
/// process-wide for a given configuration and a wraparound wait under one
/// node id never blocks callers using another. Construct a
/// [`SnowflakeGenerator`] directly to get independent state or a custom
/// clock.
///
/// # Errors
///
/// See [`SnowflakeGenerator::next_id`].
///
/// # Examples
///
/// ```
/// use snowmint::{generate_snowflake_id, SnowflakeOptions};
///
/// let id = generate_snowflake_id(&SnowflakeOptions::default()).unwrap();
/// assert!(id.bytes().all(|b| b.is_ascii_digit()));
///
/// assert!(generate_snowflake_id(&SnowflakeOptions::default().with_node_id(1024)).is_err());
/// ```
pub fn generate_snowflake_id(options: &SnowflakeOptions) -> Result<String> {
    global_generator(options)
        .next_id(options)
        .map(|id| id.to_string())
}

/// Parses a Snowflake ID from its decimal form into its fields.
///
/// `epoch` must be the one used at generation and defaults to
/// [`DEFAULT_EPOCH`].
///
/// # Errors
///
/// Returns [`crate::Error::MalformedIdentifier`] if `id` is not an unsigned
/// 64-bit decimal integer.
///
/// # Examples
///
/// ```
/// use snowmint::parse_snowflake_id;
///
/// let parsed = parse_snowflake_id("4194312193", Some(0)).unwrap();
/// assert_eq!(parsed.unix_millis(), 1000);
/// assert_eq!(parsed.node_id, 2);
/// assert_eq!(parsed.sequence, 1);
/// ```
pub fn parse_snowflake_id(id: &str, epoch: Option<u64>) -> Result<ParsedSnowflake> {
    SnowflakeId::parse(id, epoch.unwrap_or(DEFAULT_EPOCH))
}
