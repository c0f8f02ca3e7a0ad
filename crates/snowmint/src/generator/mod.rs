mod mutex;
mod options;
mod snowflake;
mod status;
#[cfg(test)]
mod tests;

pub use mutex::*;
pub use options::*;
pub use snowflake::*;
pub use status::*;
