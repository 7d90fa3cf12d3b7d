//! Radio UART receive task
//!
//! Receives packets from the radio coprocessor and queues them for the
//! command task. A packet that finds the queue full is answered with a
//! busy Nack so the ground station can resend it.

use defmt::*;
use embassy_rp::uart::BufferedUartRx;
use embassy_sync::channel::TrySendError;
use embedded_io_async::Read;

use pirouette_core::controller::busy_reply;
use pirouette_protocol::PacketParser;

use crate::channels::{COMMAND_CHANNEL, REPLY_CHANNEL};

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 64;

/// Radio RX task - receives and parses packets from the radio coprocessor
#[embassy_executor::task]
pub async fn radio_rx_task(mut rx: BufferedUartRx) {
    info!("Radio RX task started");

    let mut parser = PacketParser::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) if n > 0 => {
                trace!("RX: {} bytes", n);

                for &byte in &buf[..n] {
                    match parser.feed(byte) {
                        Ok(Some(packet)) => {
                            debug!("Packet type {=u8:#x}, {} bytes", packet.msg_type, packet.payload.len());
                            let msg_type = packet.msg_type;
                            if let Err(TrySendError::Full(packet)) = COMMAND_CHANNEL.try_send(packet) {
                                warn!("Command channel full, refusing type {=u8:#x}", msg_type);
                                if REPLY_CHANNEL.try_send(busy_reply(&packet)).is_err() {
                                    error!("Reply channel full, busy reply for {=u8:#x} lost", msg_type);
                                }
                            }
                        }
                        Ok(None) => {
                            // Need more bytes
                        }
                        Err(e) => {
                            warn!("Packet parse error: {:?}", e);
                        }
                    }
                }
            }
            Ok(_) => {
                // No bytes read, continue
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}
