//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default sequencer tick interval
pub const DEFAULT_TICK_INTERVAL_MS: u32 = 50;

/// Default length of one dance time unit
pub const DEFAULT_TIME_UNIT_MS: u32 = 100;

/// Default radio coprocessor UART baud rate
pub const DEFAULT_RADIO_BAUDRATE: u32 = 115_200;

/// Default choreography sector size (one RP2040 erase sector)
pub const DEFAULT_SECTOR_SIZE: u32 = 4096;

/// Default choreography sector offset: the last sector of a 2 MiB flash
pub const DEFAULT_REGION_OFFSET: u32 = 2 * 1024 * 1024 - DEFAULT_SECTOR_SIZE;

/// Sequencer timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SequencerConfig {
    /// Period between two sequencer ticks
    pub tick_interval_ms: u32,
    /// Milliseconds per choreography timestamp unit
    pub time_unit_ms: u32,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            time_unit_ms: DEFAULT_TIME_UNIT_MS,
        }
    }
}

/// Radio coprocessor link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RadioLinkConfig {
    pub baudrate: u32,
}

impl Default for RadioLinkConfig {
    fn default() -> Self {
        Self {
            baudrate: DEFAULT_RADIO_BAUDRATE,
        }
    }
}

/// Location of the choreography sector in flash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoreConfig {
    /// Offset of the sector from the start of flash
    pub region_offset: u32,
    /// Sector size; the region must be aligned to it
    pub sector_size: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            region_offset: DEFAULT_REGION_OFFSET,
            sector_size: DEFAULT_SECTOR_SIZE,
        }
    }
}

/// Complete robot configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RobotConfig {
    pub sequencer: SequencerConfig,
    pub radio: RadioLinkConfig,
    pub store: StoreConfig,
}

/// Invalid configuration values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Tick interval must be non-zero
    ZeroTickInterval,
    /// Time unit must be non-zero
    ZeroTimeUnit,
    /// Baud rate must be non-zero
    ZeroBaudrate,
    /// Sector size must be non-zero
    ZeroSectorSize,
    /// Region offset is not a multiple of the sector size
    UnalignedRegion,
    /// Sector cannot hold the choreography layout
    SectorTooSmall,
}

impl RobotConfig {
    /// Check values the firmware relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sequencer.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.sequencer.time_unit_ms == 0 {
            return Err(ConfigError::ZeroTimeUnit);
        }
        if self.radio.baudrate == 0 {
            return Err(ConfigError::ZeroBaudrate);
        }
        if self.store.sector_size == 0 {
            return Err(ConfigError::ZeroSectorSize);
        }
        if self.store.region_offset % self.store.sector_size != 0 {
            return Err(ConfigError::UnalignedRegion);
        }
        if (self.store.sector_size as usize) < crate::store::LAYOUT_SIZE {
            return Err(ConfigError::SectorTooSmall);
        }
        Ok(())
    }
}
