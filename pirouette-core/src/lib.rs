//! Board-agnostic core logic for the choreography player firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Staging buffer for choreography uploads
//! - Durable store with its fixed flash layout
//! - Sequencer turning the dance date into motion and color actions
//! - Dance gate and status register
//! - Dance clock and radio command handling
//! - Hardware abstraction traits (flash, motion, lighting)
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod choreography;
pub mod clock;
pub mod config;
pub mod controller;
pub mod gate;
pub mod sequencer;
pub mod staging;
pub mod store;
pub mod traits;

pub use choreography::{Choreography, MAX_COLOR_POINTS, MAX_MOVE_POINTS};
pub use clock::DanceClock;
pub use controller::DanceController;
pub use gate::DanceStatus;
pub use sequencer::{Sequencer, SequencerAction};
pub use staging::{CapacityError, StagingBuffer};
pub use store::{CommitError, CommitStep, DurableStore};
