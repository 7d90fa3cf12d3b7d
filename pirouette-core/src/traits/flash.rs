//! Flash region abstraction
//!
//! The choreography lives in one dedicated erase sector. Implementations
//! address it with offsets relative to the start of that sector.
//!
//! All operations are blocking: a commit runs with interrupts disabled, so
//! nothing may yield to the executor half way through an erase or program.

/// Errors from the flash medium
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Sector erase failed
    Erase,
    /// Programming failed
    Program,
    /// Read failed
    Read,
    /// Offset or length outside the region
    OutOfBounds,
    /// Operation did not complete
    Timeout,
}

impl FlashError {
    /// Whether repeating the operation can reasonably succeed
    pub fn is_retryable(self) -> bool {
        matches!(self, FlashError::Erase | FlashError::Program | FlashError::Read)
    }
}

/// A single erasable flash region
///
/// Erased bytes read back as `0xFF`.
pub trait FlashRegion {
    /// Region size in bytes
    fn capacity(&self) -> usize;

    /// Erase the whole region
    fn erase(&mut self) -> Result<(), FlashError>;

    /// Program `data` at `offset`
    ///
    /// The target bytes must have been erased since they were last written.
    fn program(&mut self, offset: u32, data: &[u8]) -> Result<(), FlashError>;

    /// Read `buffer.len()` bytes from `offset`
    fn read(&mut self, offset: u32, buffer: &mut [u8]) -> Result<(), FlashError>;
}
