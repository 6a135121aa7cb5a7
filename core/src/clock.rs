//! Simulation clock
//!
//! Time only moves when the driver calls `advance`. Nothing here reads the
//! wall clock, so a run replays identically given the same inputs.

/// Milliseconds of simulation time
pub type Millis = u64;

/// Monotonic simulation clock.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimClock {
    now_ms: Millis,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulation time in milliseconds
    pub fn now_ms(&self) -> Millis {
        self.now_ms
    }

    /// Move the clock forward. Saturates rather than wrapping.
    pub fn advance(&mut self, dt_ms: Millis) {
        self.now_ms = self.now_ms.saturating_add(dt_ms);
    }
}

/// Format a millisecond timestamp as MM:SS.mmm
pub fn format_sim_time(ms: Millis) -> String {
    let mins = ms / 60_000;
    let secs = (ms % 60_000) / 1000;
    let millis = ms % 1000;
    format!("{:02}:{:02}.{:03}", mins, secs, millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_advance_sums_deltas() {
        let mut clock = SimClock::new();
        let deltas = [0, 16, 250, 1000, 3];
        for dt in deltas {
            clock.advance(dt);
        }
        assert_eq!(clock.now_ms(), deltas.iter().sum::<u64>());
    }

    #[test]
    fn test_advance_saturates() {
        let mut clock = SimClock::new();
        clock.advance(u64::MAX);
        clock.advance(10);
        assert_eq!(clock.now_ms(), u64::MAX);
    }

    #[test]
    fn test_format() {
        assert_eq!(format_sim_time(0), "00:00.000");
        assert_eq!(format_sim_time(15_230), "00:15.230");
        assert_eq!(format_sim_time(165_500), "02:45.500");
    }
}
