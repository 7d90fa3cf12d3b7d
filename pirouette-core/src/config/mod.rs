//! Configuration types
//!
//! Board-level settings for the choreography player. The firmware reads
//! them from `robot.toml` at build time.

pub mod types;

pub use types::*;
