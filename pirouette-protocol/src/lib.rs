//! Radio Link Protocol
//!
//! This crate defines the UART protocol between the robot's main controller
//! and its radio coprocessor, plus the fixed-width wire records used to
//! upload a choreography.
//!
//! # Protocol Overview
//!
//! All messages use a simple binary packet format:
//! ```text
//! ┌───────┬────────┬──────┬─────────────┬──────────┐
//! │ START │ LENGTH │ TYPE │ PAYLOAD     │ CHECKSUM │
//! │ 1B    │ 1B     │ 1B   │ 0–250B      │ 1B       │
//! └───────┴────────┴──────┴─────────────┴──────────┘
//! ```
//!
//! The radio coprocessor only relays packets between the ground station and
//! the robot. Every choreography decision is taken on the robot.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod messages;
pub mod packet;
pub mod records;

pub use messages::{CommandError, NackReason, RadioCommand, RobotReply, StatusReport};
pub use packet::{Packet, PacketError, PacketParser, MAX_PAYLOAD_SIZE, PACKET_START};
pub use records::{decode_records, encode_records, ColorEvent, Waypoint, WireRecord};
