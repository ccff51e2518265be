//! Shared utilities for the hiroba chat relay.
//!
//! Logging setup and time handling used by both the server and the
//! client binaries.

pub mod logger;
pub mod time;
