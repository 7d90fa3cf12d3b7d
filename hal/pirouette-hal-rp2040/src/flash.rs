//! Flash sector driver for RP2040
//!
//! The stored choreography occupies a sector-aligned region near the end of
//! the 2MB flash, well clear of the firmware image. Accesses are blocking: the
//! store runs its commit inside a critical section and the ROM flash
//! routines already stall the XIP bus for their duration.
//!
//! Implements the `FlashRegion` trait from `pirouette-core`.

use embassy_rp::flash::{Blocking, Error, Flash, ERASE_SIZE};
use embassy_rp::peripherals::FLASH;
use embassy_rp::Peri;
use pirouette_core::traits::{FlashError, FlashRegion};

#[cfg(feature = "defmt")]
use defmt::warn;

/// Flash size on the robot board
pub const FLASH_SIZE: usize = 2 * 1024 * 1024;

/// Flash erase size for RP2040
pub const FLASH_ERASE_SIZE: usize = ERASE_SIZE;

/// The choreography region of the RP2040 flash
///
/// One or more whole erase sectors starting at `base`.
pub struct DanceSector<'d> {
    flash: Flash<'d, FLASH, Blocking, FLASH_SIZE>,
    base: u32,
    size: u32,
}

impl<'d> DanceSector<'d> {
    /// Claim the flash peripheral and address `size` bytes at `base`
    ///
    /// `base` and `size` must be multiples of [`FLASH_ERASE_SIZE`] and the
    /// region must lie inside flash; the firmware build script checks this
    /// for the configured region, and every access re-checks it.
    pub fn new(flash: Peri<'d, FLASH>, base: u32, size: u32) -> Self {
        Self {
            flash: Flash::new_blocking(flash),
            base,
            size,
        }
    }

    /// Absolute flash offset of the sector
    pub fn base(&self) -> u32 {
        self.base
    }

    /// Region size in bytes
    pub fn size(&self) -> u32 {
        self.size
    }

    fn absolute(&self, offset: u32, len: usize) -> Result<u32, FlashError> {
        let size = self.size as usize;
        let base = self.base as usize;
        let aligned = base % FLASH_ERASE_SIZE == 0 && size % FLASH_ERASE_SIZE == 0;
        if !aligned || base + size > FLASH_SIZE || offset as usize + len > size {
            return Err(FlashError::OutOfBounds);
        }
        Ok(self.base + offset)
    }
}

/// Translate a driver error, `op` naming the operation that failed
fn map_error(op: FlashError, error: Error) -> FlashError {
    #[cfg(feature = "defmt")]
    warn!("Flash {} failed: {}", op, error);

    match error {
        Error::OutOfBounds | Error::Unaligned => FlashError::OutOfBounds,
        _ => op,
    }
}

impl FlashRegion for DanceSector<'_> {
    fn capacity(&self) -> usize {
        self.size as usize
    }

    fn erase(&mut self) -> Result<(), FlashError> {
        let from = self.absolute(0, self.size as usize)?;
        self.flash
            .blocking_erase(from, from + self.size)
            .map_err(|e| map_error(FlashError::Erase, e))
    }

    fn program(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError> {
        let at = self.absolute(offset, data.len())?;
        self.flash
            .blocking_write(at, data)
            .map_err(|e| map_error(FlashError::Program, e))
    }

    fn read(&mut self, offset: u32, buffer: &mut [u8]) -> Result<(), FlashError> {
        let at = self.absolute(offset, buffer.len())?;
        self.flash
            .blocking_read(at, buffer)
            .map_err(|e| map_error(FlashError::Read, e))
    }
}
