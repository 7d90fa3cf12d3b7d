//! Persisted choreography layout
//!
//! ```text
//! Offset  Size        Content
//! 0       64 × 11     waypoint records
//! 704     4           waypoint count (u32 LE)
//! 708     110 × 6     color records
//! 1368    4           color count (u32 LE)
//! ```
//!
//! There is no header, version or checksum. An erased sector reads back
//! `0xFFFF_FFFF` for both counts, which every reader clamps to zero.

use pirouette_protocol::{ColorEvent, Waypoint, WireRecord};

use crate::choreography::{MAX_COLOR_POINTS, MAX_MOVE_POINTS};

/// Size of a persisted element count
pub const COUNT_SIZE: usize = 4;

pub const MOVES_OFFSET: u32 = 0;
pub const MOVE_COUNT_OFFSET: u32 = MOVES_OFFSET + (MAX_MOVE_POINTS * Waypoint::WIRE_SIZE) as u32;
pub const COLORS_OFFSET: u32 = MOVE_COUNT_OFFSET + COUNT_SIZE as u32;
pub const COLOR_COUNT_OFFSET: u32 =
    COLORS_OFFSET + (MAX_COLOR_POINTS * ColorEvent::WIRE_SIZE) as u32;

/// Total bytes used by the layout
pub const LAYOUT_SIZE: usize = COLOR_COUNT_OFFSET as usize + COUNT_SIZE;

/// Largest record array in the layout
pub const MAX_ARRAY_SIZE: usize = {
    let moves = MAX_MOVE_POINTS * Waypoint::WIRE_SIZE;
    let colors = MAX_COLOR_POINTS * ColorEvent::WIRE_SIZE;
    if moves > colors {
        moves
    } else {
        colors
    }
};

/// Encode an element count
pub fn encode_count(count: usize) -> [u8; COUNT_SIZE] {
    (count as u32).to_le_bytes()
}

/// Decode a persisted element count, treating anything above `capacity` as zero
pub fn decode_count(bytes: [u8; COUNT_SIZE], capacity: usize) -> usize {
    let raw = u32::from_le_bytes(bytes) as usize;
    if raw > capacity {
        0
    } else {
        raw
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets() {
        assert_eq!(MOVE_COUNT_OFFSET, 704);
        assert_eq!(COLORS_OFFSET, 708);
        assert_eq!(COLOR_COUNT_OFFSET, 1368);
        assert_eq!(LAYOUT_SIZE, 1372);
        assert_eq!(MAX_ARRAY_SIZE, 704);
    }

    #[test]
    fn test_erased_count_clamps_to_zero() {
        assert_eq!(decode_count([0xFF; 4], MAX_MOVE_POINTS), 0);
    }

    #[test]
    fn test_count_over_capacity_clamps_to_zero() {
        assert_eq!(decode_count(encode_count(65), MAX_MOVE_POINTS), 0);
        assert_eq!(decode_count(encode_count(64), MAX_MOVE_POINTS), 64);
        assert_eq!(decode_count(encode_count(0), MAX_COLOR_POINTS), 0);
    }
}
