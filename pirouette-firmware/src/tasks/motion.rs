//! Motion task
//!
//! Receives segment and rest commands from the sequencer. Path
//! interpolation and wheel control live in the motion engine on the drive
//! board; this task reports what it would hand over.

use defmt::*;

use crate::channels::{MotionCommand, MOTION_CMD};

/// Motion task - waits for motion commands
#[embassy_executor::task]
pub async fn motion_task() {
    info!("Motion task started");

    let mut at_rest = false;

    loop {
        match MOTION_CMD.wait().await {
            MotionCommand::Segment { from, to } => {
                at_rest = false;
                match from {
                    Some(from) => info!(
                        "Segment ({}, {}) -> ({}, {}), radius {} -> {}",
                        from.x, from.y, to.x, to.y, to.start_radius, to.end_radius
                    ),
                    None => info!("Segment -> ({}, {})", to.x, to.y),
                }
            }
            MotionCommand::Rest => {
                // The sequencer re-sends rest on every disabled tick
                if !at_rest {
                    at_rest = true;
                    info!("Returning to rest position");
                }
            }
        }
    }
}
