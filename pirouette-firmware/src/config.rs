//! Robot configuration
//!
//! Generated by build.rs from robot.toml.

use pirouette_core::config::{RadioLinkConfig, RobotConfig, SequencerConfig, StoreConfig};

include!(concat!(env!("OUT_DIR"), "/robot_config.rs"));
