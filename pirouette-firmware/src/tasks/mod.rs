//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels/signals.

pub mod command;
pub mod lights;
pub mod motion;
pub mod radio_rx;
pub mod radio_tx;
pub mod sequencer;

pub use command::command_task;
pub use lights::lights_task;
pub use motion::motion_task;
pub use radio_rx::radio_rx_task;
pub use radio_tx::radio_tx_task;
pub use sequencer::sequencer_task;
