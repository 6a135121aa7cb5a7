//! Scenario replay
//!
//! Runs scenario steps against a live engine, forwarding signals to the
//! CLI output and checkpoints to the verifier.

pub mod runner;

pub use runner::{RunReport, ScenarioRunner};
