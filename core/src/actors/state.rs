use std::collections::BTreeMap;

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use cadence_types::Faction;

use crate::channels::Channel;
use crate::clock::Millis;
use crate::effects::TimedEffect;

pub type ActorId = String;

/// Per-ability cooldown entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cooldown {
    pub ability_id: String,
    pub ends_at_ms: Millis,
}

/// A cast in progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveCast {
    pub ability_id: String,
    pub caster_id: ActorId,
    pub target_ids: Vec<ActorId>,
    pub cast_time_ms: Millis,
    pub started_at_ms: Millis,
    /// Global cooldown reserved on completion (timed casts only)
    pub gcd_ms: Millis,
    /// Channel to open when the cast completes
    pub opens_channel: Option<String>,
    /// Timeline id of the pending completion
    pub completion_id: String,
}

impl ActiveCast {
    pub fn is_instant(&self) -> bool {
        self.cast_time_ms == 0
    }
}

/// Idle → Casting → Idle
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum CastState {
    #[default]
    Idle,
    Casting(ActiveCast),
}

impl CastState {
    pub fn is_casting(&self) -> bool {
        matches!(self, CastState::Casting(_))
    }

    pub fn active(&self) -> Option<&ActiveCast> {
        match self {
            CastState::Casting(cast) => Some(cast),
            CastState::Idle => None,
        }
    }
}

/// Per-combatant timing state.
///
/// Effects are keyed by id and belong to the actor they were applied to.
/// Channels belong to the actor maintaining them. Both maps iterate in id
/// order so a tick always visits them the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActorState {
    pub id: ActorId,
    pub faction: Faction,
    pub alive: bool,
    /// No new cast may start before this time
    pub gcd_ends_at_ms: Millis,
    pub cooldowns: HashMap<String, Cooldown>,
    pub cast: CastState,
    pub channels: BTreeMap<String, Channel>,
    pub effects: BTreeMap<String, TimedEffect>,
}

impl ActorState {
    /// Living actor with no cooldowns, channels or effects
    pub fn new(id: impl Into<ActorId>, faction: Faction) -> Self {
        Self {
            id: id.into(),
            faction,
            alive: true,
            gcd_ends_at_ms: 0,
            cooldowns: HashMap::new(),
            cast: CastState::Idle,
            channels: BTreeMap::new(),
            effects: BTreeMap::new(),
        }
    }

    pub fn is_casting(&self) -> bool {
        self.cast.is_casting()
    }

    pub fn channel(&self, channel_id: &str) -> Option<&Channel> {
        self.channels.get(channel_id)
    }

    pub fn effect(&self, effect_id: &str) -> Option<&TimedEffect> {
        self.effects.get(effect_id)
    }

    pub fn active_channels(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values().filter(|c| c.active)
    }

    /// Delete an effect and scrub its id out of every channel on this actor
    pub fn remove_effect(&mut self, effect_id: &str) -> Option<TimedEffect> {
        let removed = self.effects.remove(effect_id);
        for channel in self.channels.values_mut() {
            channel.unlink(effect_id);
        }
        removed
    }
}
