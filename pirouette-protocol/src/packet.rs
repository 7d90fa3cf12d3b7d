//! Packet framing on the radio coprocessor UART.
//!
//! Packet format:
//! - START (1 byte): 0x7E synchronization byte
//! - LENGTH (1 byte): payload length (0-250)
//! - TYPE (1 byte): message type identifier
//! - PAYLOAD (0-250 bytes): type-specific data
//! - CHECKSUM (1 byte): two's complement of the 8-bit sum of LENGTH, TYPE and PAYLOAD
//!
//! A valid packet therefore sums to zero over LENGTH..=CHECKSUM.

use heapless::Vec;

/// Packet synchronization byte
pub const PACKET_START: u8 = 0x7E;

/// Maximum payload size in bytes
pub const MAX_PAYLOAD_SIZE: usize = 250;

/// Maximum complete packet size (START + LENGTH + TYPE + MAX_PAYLOAD + CHECKSUM)
pub const MAX_PACKET_SIZE: usize = 1 + 1 + 1 + MAX_PAYLOAD_SIZE + 1;

/// Errors that can occur during packet parsing or encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketError {
    /// Payload exceeds maximum allowed size
    PayloadTooLarge,
    /// Checksum mismatch
    InvalidChecksum,
    /// Invalid packet structure
    InvalidFrame,
    /// Buffer too small for encoding
    BufferTooSmall,
}

/// A received or outgoing packet
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Packet {
    /// Message type identifier
    pub msg_type: u8,
    /// Payload data
    pub payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

fn checksum(length: u8, msg_type: u8, payload: &[u8]) -> u8 {
    let sum = payload
        .iter()
        .fold(length.wrapping_add(msg_type), |acc, &b| acc.wrapping_add(b));
    sum.wrapping_neg()
}

impl Packet {
    /// Create a packet with the given message type and payload
    pub fn new(msg_type: u8, payload: &[u8]) -> Result<Self, PacketError> {
        let payload = Vec::from_slice(payload).map_err(|_| PacketError::PayloadTooLarge)?;
        Ok(Self { msg_type, payload })
    }

    /// Create a packet with no payload
    pub fn empty(msg_type: u8) -> Self {
        Self {
            msg_type,
            payload: Vec::new(),
        }
    }

    /// Size of this packet on the wire
    pub fn wire_len(&self) -> usize {
        4 + self.payload.len()
    }

    /// Encode this packet into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, PacketError> {
        let len = self.wire_len();
        if buffer.len() < len {
            return Err(PacketError::BufferTooSmall);
        }

        let length = self.payload.len() as u8;
        let end = 3 + self.payload.len();

        buffer[0] = PACKET_START;
        buffer[1] = length;
        buffer[2] = self.msg_type;
        buffer[3..end].copy_from_slice(&self.payload);
        buffer[end] = checksum(length, self.msg_type, &self.payload);

        Ok(len)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    Sync,
    Length,
    Type,
    Payload,
    Checksum,
}

/// Byte-at-a-time packet parser
///
/// Bytes outside a packet are skipped until the next START byte.
#[derive(Debug, Clone)]
pub struct PacketParser {
    stage: Stage,
    length: u8,
    msg_type: u8,
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Default for PacketParser {
    fn default() -> Self {
        Self::new()
    }
}

impl PacketParser {
    pub const fn new() -> Self {
        Self {
            stage: Stage::Sync,
            length: 0,
            msg_type: 0,
            payload: Vec::new(),
        }
    }

    /// Drop any partially received packet
    pub fn reset(&mut self) {
        self.stage = Stage::Sync;
        self.length = 0;
        self.msg_type = 0;
        self.payload.clear();
    }

    /// Feed a single byte
    ///
    /// Returns `Ok(Some(packet))` once a complete packet with a valid
    /// checksum has been received.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Packet>, PacketError> {
        match self.stage {
            Stage::Sync => {
                if byte == PACKET_START {
                    self.stage = Stage::Length;
                }
            }
            Stage::Length => {
                if byte as usize > MAX_PAYLOAD_SIZE {
                    self.reset();
                    return Err(PacketError::InvalidFrame);
                }
                self.length = byte;
                self.stage = Stage::Type;
            }
            Stage::Type => {
                self.msg_type = byte;
                self.payload.clear();
                self.stage = if self.length == 0 {
                    Stage::Checksum
                } else {
                    Stage::Payload
                };
            }
            Stage::Payload => {
                // Length was bounded in Stage::Length, so this cannot overflow
                let _ = self.payload.push(byte);
                if self.payload.len() == self.length as usize {
                    self.stage = Stage::Checksum;
                }
            }
            Stage::Checksum => {
                let expected = checksum(self.length, self.msg_type, &self.payload);
                if byte != expected {
                    self.reset();
                    return Err(PacketError::InvalidChecksum);
                }

                let packet = Packet {
                    msg_type: self.msg_type,
                    payload: core::mem::take(&mut self.payload),
                };
                self.reset();
                return Ok(Some(packet));
            }
        }
        Ok(None)
    }
}
