//! Staging buffer
//!
//! Bounded RAM accumulator for an uploaded choreography before it is
//! committed to flash. Appends are all-or-nothing: a batch that would
//! overflow either list is refused and the buffer is left untouched.
//!
//! The sequencer never reads this buffer.

use pirouette_protocol::records::{decodable_count, decode_records};
use pirouette_protocol::{ColorEvent, Waypoint};

use crate::choreography::{Choreography, MAX_COLOR_POINTS, MAX_MOVE_POINTS};
use crate::gate::{DanceStatus, STATUS_WRITE_OK};

/// An append that would overflow the staging buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CapacityError {
    /// Records in the refused batch
    pub requested: usize,
    /// Free slots left in the list
    pub available: usize,
}

/// Choreography awaiting commit
#[derive(Debug, Clone, Default)]
pub struct StagingBuffer {
    staged: Choreography,
}

impl StagingBuffer {
    pub const fn new() -> Self {
        Self {
            staged: Choreography::new(),
        }
    }

    /// Decode and append `count` waypoint records
    ///
    /// Returns the number of records appended.
    pub fn append_moves(&mut self, bytes: &[u8], count: usize) -> Result<usize, CapacityError> {
        let n = decodable_count::<Waypoint>(bytes, count);
        let available = MAX_MOVE_POINTS - self.staged.moves.len();
        if n > available {
            return Err(CapacityError {
                requested: n,
                available,
            });
        }
        for wp in decode_records::<Waypoint>(bytes, n) {
            // Room was checked above
            let _ = self.staged.moves.push(wp);
        }
        Ok(n)
    }

    /// Decode and append `count` color event records
    ///
    /// Returns the number of records appended.
    pub fn append_colors(&mut self, bytes: &[u8], count: usize) -> Result<usize, CapacityError> {
        let n = decodable_count::<ColorEvent>(bytes, count);
        let available = MAX_COLOR_POINTS - self.staged.colors.len();
        if n > available {
            return Err(CapacityError {
                requested: n,
                available,
            });
        }
        for color in decode_records::<ColorEvent>(bytes, n) {
            let _ = self.staged.colors.push(color);
        }
        Ok(n)
    }

    /// Drop all staged records and clear the write-ok status bit
    pub fn reset(&mut self, status: &DanceStatus) {
        self.staged.clear();
        status.clear_status(STATUS_WRITE_OK);
    }

    /// Replace the staged records with a copy of `stored`
    pub fn load_from(&mut self, stored: &Choreography) {
        self.staged.clone_from(stored);
    }

    /// Empty the buffer after its contents reached flash
    pub(crate) fn clear(&mut self) {
        self.staged.clear();
    }

    pub fn choreography(&self) -> &Choreography {
        &self.staged
    }

    pub fn moves(&self) -> &[Waypoint] {
        &self.staged.moves
    }

    pub fn colors(&self) -> &[ColorEvent] {
        &self.staged.colors
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }
}
