//! Lights task
//!
//! Receives color fade targets from the sequencer and forwards them to the
//! color fade engine.

use defmt::*;

use crate::channels::COLOR_CMD;

/// Lights task - waits for fade targets
#[embassy_executor::task]
pub async fn lights_task() {
    info!("Lights task started");

    loop {
        let target = COLOR_CMD.wait().await;
        info!(
            "Fade to hsv({}, {}, {}) from {} to {}",
            target.hue,
            target.saturation,
            target.value,
            target.fade_start(),
            target.timestamp
        );
    }
}
