//! Message types exchanged with the radio coprocessor
//!
//! Message types are divided into two categories:
//! - Radio → Robot: choreography upload, commit/export, gate and clock control
//! - Robot → Radio: acknowledgements, exported records, status

use crate::packet::{Packet, PacketError, MAX_PAYLOAD_SIZE};
use crate::records::{ColorEvent, Waypoint, WireRecord};
use heapless::Vec;

// Message type IDs: Radio → Robot
pub const MSG_STORE_MOVES: u8 = 0x10;
pub const MSG_STORE_COLORS: u8 = 0x11;
pub const MSG_CLEAR_STAGING: u8 = 0x12;
pub const MSG_COMMIT: u8 = 0x13;
pub const MSG_EXPORT: u8 = 0x14;
pub const MSG_SET_DANCE_ENABLED: u8 = 0x15;
pub const MSG_SYNC_CLOCK: u8 = 0x16;
pub const MSG_STATUS_REQUEST: u8 = 0x17;

// Message type IDs: Robot → Radio
pub const MSG_ACK: u8 = 0x80;
pub const MSG_NACK: u8 = 0x81;
pub const MSG_MOVES_CHUNK: u8 = 0x82;
pub const MSG_COLORS_CHUNK: u8 = 0x83;
pub const MSG_STATUS: u8 = 0x84;

/// Records that fit in one export chunk (payload minus offset and count)
pub const MOVES_PER_CHUNK: usize = (MAX_PAYLOAD_SIZE - 2) / Waypoint::WIRE_SIZE;
pub const COLORS_PER_CHUNK: usize = (MAX_PAYLOAD_SIZE - 2) / ColorEvent::WIRE_SIZE;

/// Errors decoding a command from a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    /// Message type is not a radio → robot command
    UnknownType(u8),
    /// Payload length does not match the command layout
    BadLength,
}

/// Commands sent by the radio coprocessor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioCommand<'a> {
    /// Append waypoint records to the staging buffer
    StoreMoves { count: u8, records: &'a [u8] },
    /// Append color event records to the staging buffer
    StoreColors { count: u8, records: &'a [u8] },
    /// Discard staged records
    ClearStaging,
    /// Persist the staged choreography
    Commit,
    /// Reload the stored choreography and send it back
    Export,
    /// Open or close the dance gate
    SetDanceEnabled(bool),
    /// Set the current dance date
    SyncClock { date: u16 },
    /// Request a status report
    StatusRequest,
}

impl<'a> RadioCommand<'a> {
    /// Parse a command from a packet
    pub fn from_packet(packet: &'a Packet) -> Result<Self, CommandError> {
        let payload = packet.payload.as_slice();
        match packet.msg_type {
            MSG_STORE_MOVES => {
                let (count, records) = split_records(payload, Waypoint::WIRE_SIZE)?;
                Ok(RadioCommand::StoreMoves { count, records })
            }
            MSG_STORE_COLORS => {
                let (count, records) = split_records(payload, ColorEvent::WIRE_SIZE)?;
                Ok(RadioCommand::StoreColors { count, records })
            }
            MSG_CLEAR_STAGING => expect_empty(payload, RadioCommand::ClearStaging),
            MSG_COMMIT => expect_empty(payload, RadioCommand::Commit),
            MSG_EXPORT => expect_empty(payload, RadioCommand::Export),
            MSG_SET_DANCE_ENABLED => match payload {
                [flag] => Ok(RadioCommand::SetDanceEnabled(*flag != 0)),
                _ => Err(CommandError::BadLength),
            },
            MSG_SYNC_CLOCK => match payload {
                [lo, hi] => Ok(RadioCommand::SyncClock {
                    date: u16::from_le_bytes([*lo, *hi]),
                }),
                _ => Err(CommandError::BadLength),
            },
            MSG_STATUS_REQUEST => expect_empty(payload, RadioCommand::StatusRequest),
            other => Err(CommandError::UnknownType(other)),
        }
    }

    /// Message type of this command
    pub fn msg_type(&self) -> u8 {
        match self {
            RadioCommand::StoreMoves { .. } => MSG_STORE_MOVES,
            RadioCommand::StoreColors { .. } => MSG_STORE_COLORS,
            RadioCommand::ClearStaging => MSG_CLEAR_STAGING,
            RadioCommand::Commit => MSG_COMMIT,
            RadioCommand::Export => MSG_EXPORT,
            RadioCommand::SetDanceEnabled(_) => MSG_SET_DANCE_ENABLED,
            RadioCommand::SyncClock { .. } => MSG_SYNC_CLOCK,
            RadioCommand::StatusRequest => MSG_STATUS_REQUEST,
        }
    }

    /// Encode this command into a packet (for testing or ground tools)
    pub fn to_packet(&self) -> Result<Packet, PacketError> {
        match self {
            RadioCommand::StoreMoves { count, records }
            | RadioCommand::StoreColors { count, records } => {
                let mut payload = Vec::<u8, MAX_PAYLOAD_SIZE>::new();
                payload.push(*count).map_err(|_| PacketError::PayloadTooLarge)?;
                payload
                    .extend_from_slice(records)
                    .map_err(|_| PacketError::PayloadTooLarge)?;
                Packet::new(self.msg_type(), &payload)
            }
            RadioCommand::SetDanceEnabled(enabled) => {
                Packet::new(MSG_SET_DANCE_ENABLED, &[*enabled as u8])
            }
            RadioCommand::SyncClock { date } => Packet::new(MSG_SYNC_CLOCK, &date.to_le_bytes()),
            _ => Ok(Packet::empty(self.msg_type())),
        }
    }
}

fn split_records(payload: &[u8], record_size: usize) -> Result<(u8, &[u8]), CommandError> {
    let (&count, records) = payload.split_first().ok_or(CommandError::BadLength)?;
    if records.len() != count as usize * record_size {
        return Err(CommandError::BadLength);
    }
    Ok((count, records))
}

fn expect_empty<'a>(payload: &[u8], cmd: RadioCommand<'a>) -> Result<RadioCommand<'a>, CommandError> {
    if payload.is_empty() {
        Ok(cmd)
    } else {
        Err(CommandError::BadLength)
    }
}

/// Why a command was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum NackReason {
    /// Staging buffer has no room for the records
    Capacity = 1,
    /// Payload did not match the command layout
    Malformed = 2,
    /// Flash write failed, the commit may be retried
    CommitRetryable = 3,
    /// Flash write failed in a way that retrying will not fix
    CommitFatal = 4,
    /// Command queue full, the command was not executed
    Busy = 5,
}

impl NackReason {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(NackReason::Capacity),
            2 => Some(NackReason::Malformed),
            3 => Some(NackReason::CommitRetryable),
            4 => Some(NackReason::CommitFatal),
            5 => Some(NackReason::Busy),
            _ => None,
        }
    }
}

/// Snapshot of the robot's choreography state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusReport {
    pub flags: u8,
    pub status: u8,
    pub staged_moves: u8,
    pub staged_colors: u8,
    pub stored_moves: u8,
    pub stored_colors: u8,
}

/// Replies sent back to the radio coprocessor
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RobotReply {
    /// Command accepted
    Ack { command: u8 },
    /// Command refused
    Nack { command: u8, reason: NackReason },
    /// Slice of exported waypoints starting at `offset`
    MovesChunk { offset: u8, moves: Vec<Waypoint, MOVES_PER_CHUNK> },
    /// Slice of exported color events starting at `offset`
    ColorsChunk { offset: u8, colors: Vec<ColorEvent, COLORS_PER_CHUNK> },
    /// Status report
    Status(StatusReport),
}

impl RobotReply {
    /// Encode this reply into a packet
    pub fn to_packet(&self) -> Result<Packet, PacketError> {
        match self {
            RobotReply::Ack { command } => Packet::new(MSG_ACK, &[*command]),
            RobotReply::Nack { command, reason } => Packet::new(MSG_NACK, &[*command, *reason as u8]),
            RobotReply::MovesChunk { offset, moves } => chunk_packet(MSG_MOVES_CHUNK, *offset, moves),
            RobotReply::ColorsChunk { offset, colors } => {
                chunk_packet(MSG_COLORS_CHUNK, *offset, colors)
            }
            RobotReply::Status(s) => Packet::new(
                MSG_STATUS,
                &[
                    s.flags,
                    s.status,
                    s.staged_moves,
                    s.staged_colors,
                    s.stored_moves,
                    s.stored_colors,
                ],
            ),
        }
    }
}

fn chunk_packet<R: WireRecord>(msg_type: u8, offset: u8, records: &[R]) -> Result<Packet, PacketError> {
    let mut payload = [0u8; MAX_PAYLOAD_SIZE];
    payload[0] = offset;
    payload[1] = records.len() as u8;
    let written = crate::records::encode_records(records, &mut payload[2..])
        .ok_or(PacketError::PayloadTooLarge)?;
    Packet::new(msg_type, &payload[..2 + written])
}
