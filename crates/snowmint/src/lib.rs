#![cfg_attr(docsrs, feature(doc_cfg))]
//! Coordination-free, time-ordered 64-bit identifiers.
//!
//! A [`SnowflakeId`] packs a millisecond timestamp (relative to a caller
//! chosen epoch), a 10-bit node id, and a 12-bit per-millisecond sequence:
//!
//! ```text
//!  Bit Index:  63           63 62            22 21          12 11             0
//!              +--------------+----------------+--------------+---------------+
//!  Field:      | reserved (1) | timestamp (41) | node id (10) | sequence (12) |
//!              +--------------+----------------+--------------+---------------+
//! ```
//!
//! IDs are minted by a [`SnowflakeGenerator`] and decoded with
//! [`SnowflakeId::decode`] or [`parse_snowflake_id`]. The canonical text form
//! is the decimal rendering, which survives JSON and other text-only channels
//! without precision loss.
//!
//! ```
//! use snowmint::{SnowflakeGenerator, SnowflakeOptions, SystemClock, DEFAULT_EPOCH};
//!
//! let generator = SnowflakeGenerator::new(SystemClock);
//! let options = SnowflakeOptions::default().with_node_id(7);
//!
//! let id = generator.next_id(&options).unwrap();
//! let parsed = snowmint::parse_snowflake_id(&id.to_string(), Some(DEFAULT_EPOCH)).unwrap();
//! assert_eq!(parsed.node_id, 7);
//! ```

mod error;
#[cfg(feature = "async-tokio")]
mod futures;
mod generator;
mod global;
mod id;
#[cfg(feature = "serde")]
mod serde;
mod time;

pub use crate::error::*;
#[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
#[cfg(feature = "async-tokio")]
pub use crate::futures::*;
pub use crate::generator::*;
pub use crate::global::*;
pub use crate::id::*;
#[cfg_attr(docsrs, doc(cfg(feature = "serde")))]
#[cfg(feature = "serde")]
pub use crate::serde::*;
pub use crate::time::*;
