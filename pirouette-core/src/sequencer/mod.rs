//! Choreography sequencer
//!
//! A periodically woken state machine that advances cursors through the
//! stored timelines and tells the motion and lighting engines when to act.

pub mod events;
pub mod player;
pub mod state;

pub use events::{Actions, SequencerAction, MAX_ACTIONS};
pub use player::Sequencer;
pub use state::{Cursor, SequencerState};
