//! Dance gate and status register
//!
//! Two bytes of shared state link the radio side to the choreography core:
//!
//! - `flags`: written by the command path on behalf of the ground station.
//!   Bit [`FLAG_DANCE_ENABLED`] is the gate the sequencer samples each tick.
//! - `status`: written by the robot, reported back to the ground station.
//!
//! Every access goes through [`DanceStatus`]; a single instance is shared by
//! reference between tasks.

use portable_atomic::{AtomicU8, Ordering};

/// Sequencer advances along the timeline while set
pub const FLAG_DANCE_ENABLED: u8 = 1 << 0;

/// Last commit reached the store intact
pub const STATUS_WRITE_OK: u8 = 1 << 0;
/// Last commit failed
pub const STATUS_WRITE_FAILED: u8 = 1 << 1;

/// Shared gate flag and status bits
#[derive(Debug)]
pub struct DanceStatus {
    flags: AtomicU8,
    status: AtomicU8,
}

impl Default for DanceStatus {
    fn default() -> Self {
        Self::new()
    }
}

impl DanceStatus {
    /// Gate closed, no status bits set
    pub const fn new() -> Self {
        Self {
            flags: AtomicU8::new(0),
            status: AtomicU8::new(0),
        }
    }

    /// Whether the sequencer should advance along the timeline
    pub fn dance_enabled(&self) -> bool {
        self.flags.load(Ordering::Acquire) & FLAG_DANCE_ENABLED != 0
    }

    /// Open or close the gate
    pub fn set_dance_enabled(&self, enabled: bool) {
        if enabled {
            self.flags.fetch_or(FLAG_DANCE_ENABLED, Ordering::AcqRel);
        } else {
            self.flags.fetch_and(!FLAG_DANCE_ENABLED, Ordering::AcqRel);
        }
    }

    pub fn flags(&self) -> u8 {
        self.flags.load(Ordering::Acquire)
    }

    pub fn status(&self) -> u8 {
        self.status.load(Ordering::Acquire)
    }

    pub fn set_status(&self, bits: u8) {
        self.status.fetch_or(bits, Ordering::AcqRel);
    }

    pub fn clear_status(&self, bits: u8) {
        self.status.fetch_and(!bits, Ordering::AcqRel);
    }

    /// Record the outcome of a commit
    pub fn record_commit(&self, ok: bool) {
        if ok {
            self.clear_status(STATUS_WRITE_FAILED);
            self.set_status(STATUS_WRITE_OK);
        } else {
            self.clear_status(STATUS_WRITE_OK);
            self.set_status(STATUS_WRITE_FAILED);
        }
    }
}
