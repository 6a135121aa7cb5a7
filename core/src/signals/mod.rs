//! Combat signal stream
//!
//! Everything the engine wants the outside world to know leaves through one
//! tagged `CombatSignal` stream. Subscribers implement `SignalHandler`.

pub mod bus;
pub mod handler;
pub mod signal;

pub use bus::SignalBus;
pub use handler::SignalHandler;
pub use signal::{CombatSignal, StopReason};
