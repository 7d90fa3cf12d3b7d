//! Sequencer task
//!
//! Samples the dance gate and the dance clock on a fixed cadence, advances
//! the sequencer over the stored choreography and hands the resulting
//! actions to the motion and lighting tasks. Missed ticks are not caught up.

use defmt::*;
use embassy_time::{Duration, Instant, Ticker};

use pirouette_core::traits::{ColorEngine, MotionEngine};
use pirouette_core::Sequencer;
use pirouette_protocol::{ColorEvent, Waypoint};

use crate::channels::{MotionCommand, COLOR_CMD, DANCE_CLOCK, DANCE_STATUS, MOTION_CMD};
use crate::config::ROBOT_CONFIG;
use crate::SharedStore;

/// Forwards motion actions to the motion task
struct MotionHandoff;

impl MotionEngine for MotionHandoff {
    fn begin_segment(&mut self, from: Option<&Waypoint>, to: &Waypoint) {
        debug!("Segment towards ({}, {}) at {}", to.x, to.y, to.timestamp);
        MOTION_CMD.signal(MotionCommand::Segment {
            from: from.copied(),
            to: *to,
        });
    }

    fn reset_position(&mut self) {
        MOTION_CMD.signal(MotionCommand::Rest);
    }
}

/// Forwards color actions to the lights task
struct ColorHandoff;

impl ColorEngine for ColorHandoff {
    fn fade_to(&mut self, target: &ColorEvent) {
        debug!("Fade to hue {} by {}", target.hue, target.timestamp);
        COLOR_CMD.signal(*target);
    }
}

/// Sequencer task - one tick per configured interval
#[embassy_executor::task]
pub async fn sequencer_task(store: &'static SharedStore) {
    info!(
        "Sequencer task started ({}ms ticks)",
        ROBOT_CONFIG.sequencer.tick_interval_ms
    );

    let mut sequencer = store.lock(|cell| Sequencer::seeded(cell.borrow().choreography()));
    let mut motion = MotionHandoff;
    let mut lights = ColorHandoff;
    let mut running = false;

    let mut ticker = Ticker::every(Duration::from_millis(
        ROBOT_CONFIG.sequencer.tick_interval_ms as u64,
    ));

    loop {
        ticker.next().await;

        let now_ms = Instant::now().as_millis();
        let date = DANCE_CLOCK.lock(|clock| clock.get().date_at(now_ms));
        let enabled = DANCE_STATUS.dance_enabled();

        let actions =
            store.lock(|cell| sequencer.tick(date, enabled, cell.borrow().choreography()));

        if enabled != running {
            running = enabled;
            info!("Dance {} at date {}", if enabled { "started" } else { "stopped" }, date);
        }

        actions.dispatch(&mut motion, &mut lights);
    }
}
