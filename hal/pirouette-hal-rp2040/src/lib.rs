//! RP2040-specific HAL for the choreography player firmware
//!
//! This crate provides RP2040 implementations of the `pirouette-core`
//! hardware traits:
//!
//! - Flash sector holding the stored choreography (implements
//!   `pirouette_core::traits::FlashRegion`)

#![no_std]

pub mod flash;

pub use flash::{DanceSector, FLASH_ERASE_SIZE, FLASH_SIZE};
