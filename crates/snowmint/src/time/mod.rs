mod interface;
mod system_clock;

pub use interface::*;
pub use system_clock::*;

#[cfg(not(all(target_arch = "wasm32", target_os = "unknown")))]
pub(crate) use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
pub(crate) use web_time::{SystemTime, UNIX_EPOCH};
