//! Checkpoint verification for scenario runs
//!
//! Checkpoint steps declare expected engine state; the verifier checks it.

pub mod checkpoint;

pub use checkpoint::{Checkpoint, CheckpointResult, CheckpointVerifier, Observed, VerificationResult};
