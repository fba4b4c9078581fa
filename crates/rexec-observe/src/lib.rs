//! Logging setup shared by the rexec binaries.

mod logger;
pub use logger::*;
