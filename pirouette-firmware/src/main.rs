//! Pirouette - Choreography Player Firmware
//!
//! Main firmware binary for RP2040-based dancing robots. The robot stores
//! one choreography in flash and replays it against the dance clock shared
//! by the whole swarm; uploads and control arrive through a radio
//! coprocessor on UART0.

#![no_std]
#![no_main]

use core::cell::RefCell;

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::UART0;
use embassy_rp::uart::{BufferedInterruptHandler, Config as UartConfig, Uart};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use pirouette_core::DurableStore;
use pirouette_hal_rp2040::DanceSector;

use crate::config::ROBOT_CONFIG;

mod channels;
mod config;
mod tasks;

/// Durable store shared by the command and sequencer tasks
pub type SharedStore =
    Mutex<CriticalSectionRawMutex, RefCell<DurableStore<DanceSector<'static>>>>;

bind_interrupts!(struct Irqs {
    UART0_IRQ => BufferedInterruptHandler<UART0>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 512]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 512]> = StaticCell::new();

static STORE: StaticCell<SharedStore> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Pirouette firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Load the stored choreography
    let sector = DanceSector::new(
        p.FLASH,
        ROBOT_CONFIG.store.region_offset,
        ROBOT_CONFIG.store.sector_size,
    );
    let mut store = DurableStore::new(sector);
    match store.reload() {
        Ok(()) => {
            let stored = store.choreography();
            info!(
                "Stored choreography: {} moves, {} colors",
                stored.moves.len(),
                stored.colors.len()
            );
        }
        Err(e) => error!("Failed to read choreography sector: {:?}", e),
    }
    let store: &'static SharedStore = STORE.init(Mutex::new(RefCell::new(store)));

    // Setup UART for the radio coprocessor
    let mut uart_config = UartConfig::default();
    uart_config.baudrate = ROBOT_CONFIG.radio.baudrate;

    let tx_buf = TX_BUF.init([0u8; 512]);
    let rx_buf = RX_BUF.init([0u8; 512]);

    let uart = Uart::new_blocking(p.UART0, p.PIN_0, p.PIN_1, uart_config);
    let uart = uart.into_buffered(Irqs, tx_buf, rx_buf);
    let (tx, rx) = uart.split();

    info!("UART initialized for radio link at {} baud", ROBOT_CONFIG.radio.baudrate);

    // Spawn tasks
    spawner.spawn(tasks::radio_rx_task(rx)).unwrap();
    spawner.spawn(tasks::radio_tx_task(tx)).unwrap();
    spawner.spawn(tasks::command_task(store)).unwrap();
    spawner.spawn(tasks::motion_task()).unwrap();
    spawner.spawn(tasks::lights_task()).unwrap();
    spawner.spawn(tasks::sequencer_task(store)).unwrap();

    info!("All tasks spawned, firmware running");

    // Main task has nothing else to do - all work happens in spawned tasks
    loop {
        embassy_time::Timer::after_secs(60).await;
        trace!("Main loop heartbeat");
    }
}
