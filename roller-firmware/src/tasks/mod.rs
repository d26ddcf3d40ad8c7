//! Embassy async tasks
//!
//! The bridge tasks move frames between the UART and the channels; the
//! control task runs the synchronous loop on a fixed period.

pub mod bridge_rx;
pub mod bridge_tx;
pub mod control;

pub use bridge_rx::bridge_rx_task;
pub use bridge_tx::bridge_tx_task;
pub use control::control_task;
