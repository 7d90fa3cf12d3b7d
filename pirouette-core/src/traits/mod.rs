//! Hardware and collaborator abstraction traits
//!
//! These traits define the interface between the choreography logic and
//! board-specific implementations.

pub mod flash;
pub mod lighting;
pub mod motion;

pub use flash::{FlashError, FlashRegion};
pub use lighting::ColorEngine;
pub use motion::MotionEngine;
