//! Timed effect model
//!
//! This module provides the runtime state of buffs, debuffs,
//! damage/heal-over-time effects and auras. Lifecycle operations
//! (add, remove, per-tick countdown and pulses) live on `TimingEngine`.
//!
//! # Duration models
//!
//! ```text
//!   normal     ──── counting down from the moment it is added ────▶ expired
//!
//!   post-stop  ──── frozen while channel active ────┐
//!                                                   │ channel stops
//!                                                   ▼
//!                                     counting down ────▶ expired
//! ```
//!
//! Periodic pulses run in both cases, frozen or not.

mod active;

pub use active::{AURA_PULSE_TAG, DOT_TICK_TAG, Payload, Periodic, TimedEffect};
