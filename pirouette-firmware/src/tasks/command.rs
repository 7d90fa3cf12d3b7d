//! Command task
//!
//! Handles command packets from the radio coprocessor. Owns the staging
//! buffer through the [`DanceController`]; the durable store is only
//! touched inside its critical-section lock, so a commit runs with
//! interrupts disabled and never interleaves with a sequencer tick.

use defmt::*;
use embassy_time::Instant;

use pirouette_core::DanceController;
use pirouette_protocol::messages::MSG_COMMIT;
use pirouette_protocol::RobotReply;

use crate::channels::{COMMAND_CHANNEL, DANCE_CLOCK, DANCE_STATUS, REPLY_CHANNEL};
use crate::SharedStore;

/// Command task - processes one packet at a time
#[embassy_executor::task]
pub async fn command_task(store: &'static SharedStore) {
    info!("Command task started");

    let mut controller = DanceController::new();

    loop {
        let packet = COMMAND_CHANNEL.receive().await;
        let now_ms = Instant::now().as_millis();

        let reply = store.lock(|cell| {
            DANCE_CLOCK.lock(|clock| {
                let mut dance_clock = clock.get();
                let mut durable = cell.borrow_mut();
                let reply = controller.handle_packet(
                    &packet,
                    &mut *durable,
                    &DANCE_STATUS,
                    &mut dance_clock,
                    now_ms,
                );
                clock.set(dance_clock);
                reply
            })
        });

        match &reply {
            RobotReply::Ack { command } if *command == MSG_COMMIT => {
                let stored = store.lock(|cell| {
                    let durable = cell.borrow();
                    let c = durable.choreography();
                    (c.moves.len(), c.colors.len())
                });
                info!("Choreography committed: {} moves, {} colors", stored.0, stored.1);
            }
            RobotReply::Ack { command } => debug!("Command {=u8:#x} accepted", *command),
            RobotReply::Nack { command, reason } => {
                warn!("Command {=u8:#x} refused: {:?}", *command, reason)
            }
            _ => {}
        }

        for chunk in controller.export_chunks() {
            REPLY_CHANNEL.send(chunk).await;
        }
        REPLY_CHANNEL.send(reply).await;
    }
}
