use super::signal::CombatSignal;

/// Trait for systems that react to combat signals.
/// Implement this for damage/heal resolvers, trigger logic, UI feeds, etc.
pub trait SignalHandler {
    /// Handle a single signal.
    fn handle_signal(&mut self, signal: &CombatSignal);

    /// Handle multiple signals (default implementation calls handle_signal for each)
    fn handle_signals(&mut self, signals: &[CombatSignal]) {
        for signal in signals {
            self.handle_signal(signal);
        }
    }
}

impl<F> SignalHandler for F
where
    F: FnMut(&CombatSignal),
{
    fn handle_signal(&mut self, signal: &CombatSignal) {
        self(signal)
    }
}
