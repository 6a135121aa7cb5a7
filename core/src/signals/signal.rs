use serde::{Deserialize, Serialize};

use crate::actors::ActorId;
use crate::clock::Millis;

/// Why a channel stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Caller asked for it
    #[default]
    Manual,
    /// Upkeep drained a pool to zero
    Exhausted,
}

/// Lifecycle notifications broadcast on the signal bus.
///
/// The engine produces the first group itself. The combat triggers at the end
/// are raised by collaborating systems (damage/heal resolvers) through
/// `TimingEngine::publish` so trigger logic can be layered on the same stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum CombatSignal {
    // Engine lifecycle
    Tick {
        dt_ms: Millis,
        now_ms: Millis,
    },
    CastComplete {
        caster_id: ActorId,
        ability_id: String,
        target_ids: Vec<ActorId>,
    },
    ChannelStart {
        source_id: ActorId,
        channel_id: String,
    },
    ChannelStop {
        source_id: ActorId,
        channel_id: String,
        #[serde(default)]
        reason: StopReason,
    },
    EffectPulse {
        owner_id: ActorId,
        effect_id: String,
        #[serde(default)]
        tag: Option<String>,
    },
    EffectExpired {
        owner_id: ActorId,
        effect_id: String,
    },

    // Externally raised combat triggers
    AllyHit {
        source_id: ActorId,
        target_id: ActorId,
        #[serde(default)]
        is_crit: bool,
    },
    AllyCrit {
        source_id: ActorId,
        target_id: ActorId,
    },
    EnemyHitAlly {
        source_id: ActorId,
        target_id: ActorId,
    },
    AllyHeal {
        source_id: ActorId,
        target_id: ActorId,
        amount_pct: f64,
    },
    AllyKill {
        source_id: ActorId,
        target_id: ActorId,
    },
}

impl CombatSignal {
    /// Stable snake_case name, matching the serialized `type` tag
    pub fn name(&self) -> &'static str {
        match self {
            CombatSignal::Tick { .. } => "tick",
            CombatSignal::CastComplete { .. } => "cast_complete",
            CombatSignal::ChannelStart { .. } => "channel_start",
            CombatSignal::ChannelStop { .. } => "channel_stop",
            CombatSignal::EffectPulse { .. } => "effect_pulse",
            CombatSignal::EffectExpired { .. } => "effect_expired",
            CombatSignal::AllyHit { .. } => "ally_hit",
            CombatSignal::AllyCrit { .. } => "ally_crit",
            CombatSignal::EnemyHitAlly { .. } => "enemy_hit_ally",
            CombatSignal::AllyHeal { .. } => "ally_heal",
            CombatSignal::AllyKill { .. } => "ally_kill",
        }
    }

    /// True for the combat triggers the engine never emits on its own
    pub fn is_external(&self) -> bool {
        matches!(
            self,
            CombatSignal::AllyHit { .. }
                | CombatSignal::AllyCrit { .. }
                | CombatSignal::EnemyHitAlly { .. }
                | CombatSignal::AllyHeal { .. }
                | CombatSignal::AllyKill { .. }
        )
    }
}
