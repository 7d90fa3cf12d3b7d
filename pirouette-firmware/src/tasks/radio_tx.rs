//! Radio UART transmit task
//!
//! Frames replies and writes them to the radio coprocessor.

use defmt::*;
use embassy_rp::uart::BufferedUartTx;
use embedded_io_async::Write;

use pirouette_protocol::packet::MAX_PACKET_SIZE;

use crate::channels::REPLY_CHANNEL;

/// Radio TX task - sends queued replies
#[embassy_executor::task]
pub async fn radio_tx_task(mut tx: BufferedUartTx) {
    info!("Radio TX task started");

    let mut buf = [0u8; MAX_PACKET_SIZE];

    loop {
        let reply = REPLY_CHANNEL.receive().await;

        let packet = match reply.to_packet() {
            Ok(packet) => packet,
            Err(e) => {
                error!("Failed to build reply packet: {:?}", e);
                continue;
            }
        };

        match packet.encode(&mut buf) {
            Ok(len) => {
                if let Err(e) = tx.write_all(&buf[..len]).await {
                    warn!("Failed to send reply: {:?}", e);
                } else {
                    trace!("Reply type {=u8:#x} sent", packet.msg_type);
                }
            }
            Err(e) => error!("Failed to encode reply: {:?}", e),
        }
    }
}
