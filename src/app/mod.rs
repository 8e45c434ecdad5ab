//! Application-level helpers used by the binary.

mod check;
mod shutdown;

pub use check::{check_config, CheckReport};
pub use shutdown::shutdown_token;
