//! Inter-task communication channels and shared state
//!
//! Defines the statics shared between Embassy tasks. Uses embassy-sync
//! primitives for safe async communication.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use pirouette_core::{DanceClock, DanceStatus};
use pirouette_protocol::{ColorEvent, Packet, RobotReply, Waypoint};

use crate::config::ROBOT_CONFIG;

/// Channel capacity for received command packets
const COMMAND_CHANNEL_SIZE: usize = 4;

/// Channel capacity for outgoing replies
///
/// A full export is six chunks plus the final ack.
const REPLY_CHANNEL_SIZE: usize = 8;

/// Command packets from the radio coprocessor
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Packet, COMMAND_CHANNEL_SIZE> =
    Channel::new();

/// Replies to the radio coprocessor
pub static REPLY_CHANNEL: Channel<CriticalSectionRawMutex, RobotReply, REPLY_CHANNEL_SIZE> =
    Channel::new();

/// Dance gate and status register
pub static DANCE_STATUS: DanceStatus = DanceStatus::new();

/// Dance clock, written by the command task and read by the sequencer
pub static DANCE_CLOCK: Mutex<CriticalSectionRawMutex, Cell<DanceClock>> =
    Mutex::new(Cell::new(DanceClock::new(ROBOT_CONFIG.sequencer.time_unit_ms)));

/// Command for the motion engine
#[derive(Debug, Clone, Copy, defmt::Format)]
pub enum MotionCommand {
    /// Follow the path from `from` (or the current pose) to `to`
    Segment { from: Option<Waypoint>, to: Waypoint },
    /// Return to the rest position
    Rest,
}

/// Motion command signal (updated by the sequencer)
pub static MOTION_CMD: Signal<CriticalSectionRawMutex, MotionCommand> = Signal::new();

/// Color fade target signal (updated by the sequencer)
pub static COLOR_CMD: Signal<CriticalSectionRawMutex, ColorEvent> = Signal::new();
