//! Publish/subscribe channel for combat signals

use std::fmt;

use super::handler::SignalHandler;
use super::signal::CombatSignal;

/// Broadcasts signals to subscribers synchronously, in subscription order,
/// and optionally buffers them for the driver to drain after each step.
pub struct SignalBus {
    handlers: Vec<Box<dyn SignalHandler>>,
    pending: Vec<CombatSignal>,
    retain: bool,
}

impl fmt::Debug for SignalBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalBus")
            .field("handlers", &self.handlers.len())
            .field("pending", &self.pending.len())
            .field("retain", &self.retain)
            .finish()
    }
}

impl Default for SignalBus {
    fn default() -> Self {
        Self::new(true)
    }
}

impl SignalBus {
    pub fn new(retain: bool) -> Self {
        Self {
            handlers: Vec::new(),
            pending: Vec::new(),
            retain,
        }
    }

    pub fn subscribe(&mut self, handler: impl SignalHandler + 'static) {
        self.handlers.push(Box::new(handler));
    }

    pub fn emit(&mut self, signal: CombatSignal) {
        tracing::trace!(signal = signal.name(), "emit");
        for handler in &mut self.handlers {
            handler.handle_signal(&signal);
        }
        if self.retain {
            self.pending.push(signal);
        }
    }

    /// Signals emitted since the last `take`
    pub fn pending(&self) -> &[CombatSignal] {
        &self.pending
    }

    pub fn take(&mut self) -> Vec<CombatSignal> {
        std::mem::take(&mut self.pending)
    }
}
