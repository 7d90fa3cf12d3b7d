//! Dance clock
//!
//! Maps the monotonic millisecond counter to the dance date, measured in
//! choreography time units. The ground station sends the current date with
//! a sync command; between syncs the clock free-runs from the last anchor.
//! Before the first sync the date counts from boot.

use crate::config::SequencerConfig;

/// Dance date derived from a monotonic millisecond counter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DanceClock {
    anchor_date: u32,
    anchor_ms: u64,
    time_unit_ms: u32,
    synced: bool,
}

impl DanceClock {
    /// Unsynced clock anchored at boot
    pub const fn new(time_unit_ms: u32) -> Self {
        Self {
            anchor_date: 0,
            anchor_ms: 0,
            time_unit_ms,
            synced: false,
        }
    }

    pub fn from_config(config: &SequencerConfig) -> Self {
        Self::new(config.time_unit_ms)
    }

    /// The dance date is `date` at `now_ms`
    pub fn sync(&mut self, date: u16, now_ms: u64) {
        self.anchor_date = u32::from(date);
        self.anchor_ms = now_ms;
        self.synced = true;
    }

    /// Whether a sync has been received since boot
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// Dance date at `now_ms`
    ///
    /// Readings taken before the anchor report the anchor date.
    pub fn date_at(&self, now_ms: u64) -> u32 {
        let unit = u64::from(self.time_unit_ms.max(1));
        let units = now_ms.saturating_sub(self.anchor_ms) / unit;
        let units = u32::try_from(units).unwrap_or(u32::MAX);
        self.anchor_date.saturating_add(units)
    }
}
