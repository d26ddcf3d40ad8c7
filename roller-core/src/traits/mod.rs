//! Hardware abstraction traits
//!
//! These traits define the interface between the application logic
//! and board or transport specific implementations.

pub mod actuator;
pub mod board;
pub mod repository;
pub mod transport;

pub use actuator::{Direction, MotorActuator};
pub use board::{Board, Peripherals};
pub use repository::{RepositoryError, StateRepository, SwitchSlot};
pub use transport::{ConnectOptions, InboundMessage, QoS, Transport};
