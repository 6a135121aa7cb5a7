//! Maintained channels
//!
//! A channel is an activity an actor keeps performing (a song, a dance, a
//! standing summon). While it is active, post-stop effects linked to it do
//! not lose duration. A channel may carry an upkeep cost that drains the
//! owner's pools on a fixed tick.

use serde::{Deserialize, Serialize};

use cadence_types::UpkeepRates;

use crate::actors::ActorId;
use crate::clock::Millis;

/// Upkeep cost plus the time accumulated toward the next drain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Upkeep {
    pub rates: UpkeepRates,
    #[serde(default)]
    pub accumulated_ms: Millis,
}

impl Upkeep {
    pub fn new(rates: UpkeepRates) -> Self {
        Self {
            rates,
            accumulated_ms: 0,
        }
    }

    /// Add elapsed time and return how many drain ticks are due.
    pub fn accumulate(&mut self, dt_ms: Millis, tick_ms: Millis) -> u64 {
        if tick_ms == 0 {
            return 0;
        }
        self.accumulated_ms = self.accumulated_ms.saturating_add(dt_ms);
        let ticks = self.accumulated_ms / tick_ms;
        self.accumulated_ms %= tick_ms;
        ticks
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Channel {
    pub id: String,
    pub source_actor_id: ActorId,
    /// Linked effects, in link order, without duplicates
    pub effect_ids: Vec<String>,
    pub active: bool,
    #[serde(default)]
    pub upkeep: Option<Upkeep>,
}

impl Channel {
    /// New, inactive channel
    pub fn new(
        id: impl Into<String>,
        source_actor_id: impl Into<ActorId>,
        upkeep: Option<UpkeepRates>,
    ) -> Self {
        Self {
            id: id.into(),
            source_actor_id: source_actor_id.into(),
            effect_ids: Vec::new(),
            active: false,
            upkeep: upkeep.map(Upkeep::new),
        }
    }

    /// Record a linked effect. Returns false if it was already linked.
    pub fn link(&mut self, effect_id: &str) -> bool {
        if self.is_linked(effect_id) {
            return false;
        }
        self.effect_ids.push(effect_id.to_string());
        true
    }

    pub fn unlink(&mut self, effect_id: &str) {
        self.effect_ids.retain(|id| id != effect_id);
    }

    pub fn is_linked(&self, effect_id: &str) -> bool {
        self.effect_ids.iter().any(|id| id == effect_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_is_deduplicated() {
        let mut channel = Channel::new("song:1", "bard", None);
        assert!(channel.link("aura"));
        assert!(!channel.link("aura"));
        assert_eq!(channel.effect_ids, vec!["aura".to_string()]);

        channel.unlink("aura");
        assert!(!channel.is_linked("aura"));
    }

    #[test]
    fn test_upkeep_ticks() {
        let mut upkeep = Upkeep::new(UpkeepRates::mp(10.0));
        assert_eq!(upkeep.accumulate(4_000, 5_000), 0);
        assert_eq!(upkeep.accumulate(7_000, 5_000), 2);
        assert_eq!(upkeep.accumulated_ms, 1_000);
        assert_eq!(upkeep.accumulate(10_000, 0), 0);
    }
}
