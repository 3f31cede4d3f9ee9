//! Library side of the `aki` command-line tool.

pub mod load;
pub mod logging;
