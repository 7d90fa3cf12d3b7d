//! Durable choreography storage
//!
//! Erase-and-rewrite persistence of the committed choreography in one flash
//! sector, plus the reverse load path used at boot and for export.

pub mod durable;
pub mod layout;

pub use durable::{read_choreography, CommitError, CommitStep, DurableStore};
pub use layout::LAYOUT_SIZE;
