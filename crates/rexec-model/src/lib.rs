//! Plain data types shared by the remote executor crates.
//!
//! Nothing in here performs I/O: these are the identifiers, lifecycle states and records that flow between the host scheduler, the reconciliation engine and the remote compute API.

mod domain;
pub use domain::*;
