use serde::{Deserialize, Serialize};

use cadence_core::{CombatSignal, EffectKind, Payload, TimedEffect, UpkeepRates};

use crate::verification::Checkpoint;

/// One scenario instruction, tagged by `type`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    /// Advance the clock by `ms`, in frames of `frame_ms` when given
    Advance {
        ms: u64,
        #[serde(default)]
        frame_ms: Option<u64>,
    },
    StartCast {
        actor: String,
        ability: String,
        #[serde(default)]
        cast_time_ms: u64,
        #[serde(default)]
        targets: Vec<String>,
        #[serde(default)]
        gcd_ms: Option<u64>,
        #[serde(default)]
        opens_channel: Option<String>,
        /// Rejection is the expected outcome
        #[serde(default)]
        expect_rejected: bool,
    },
    CancelCast {
        actor: String,
    },
    SetCooldown {
        actor: String,
        ability: String,
        ms: u64,
    },
    StartChannel {
        actor: String,
        channel: String,
        #[serde(default)]
        upkeep: Option<UpkeepRates>,
    },
    StopChannel {
        actor: String,
        channel: String,
    },
    StartSong {
        singer: String,
        channel: String,
        effect: String,
        duration_secs: f64,
        #[serde(default)]
        upkeep_mp_per_5s: f64,
        #[serde(default)]
        payload: Payload,
    },
    SpawnSummon {
        summoner: String,
        summon: String,
        upkeep_mp_per_5s: f64,
        #[serde(default)]
        effects: Vec<EffectSpec>,
    },
    AddEffect {
        owner: String,
        effect: EffectSpec,
        /// Channel on the owner to link to
        #[serde(default)]
        channel: Option<String>,
    },
    RemoveEffect {
        owner: String,
        effect: String,
    },
    SetAlive {
        actor: String,
        alive: bool,
    },
    Publish {
        signal: CombatSignal,
    },
    Checkpoint(Checkpoint),
}

impl Step {
    pub fn kind(&self) -> &'static str {
        match self {
            Step::Advance { .. } => "advance",
            Step::StartCast { .. } => "start_cast",
            Step::CancelCast { .. } => "cancel_cast",
            Step::SetCooldown { .. } => "set_cooldown",
            Step::StartChannel { .. } => "start_channel",
            Step::StopChannel { .. } => "stop_channel",
            Step::StartSong { .. } => "start_song",
            Step::SpawnSummon { .. } => "spawn_summon",
            Step::AddEffect { .. } => "add_effect",
            Step::RemoveEffect { .. } => "remove_effect",
            Step::SetAlive { .. } => "set_alive",
            Step::Publish { .. } => "publish",
            Step::Checkpoint(_) => "checkpoint",
        }
    }
}

/// Effect described in a scenario file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectSpec {
    pub id: String,
    pub source: String,
    #[serde(default)]
    pub kind: EffectKind,
    pub duration_secs: f64,

    /// Post-stop: frozen while a linked channel is active
    #[serde(default)]
    pub maintained: bool,

    #[serde(default)]
    pub period_ms: Option<u64>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub element: Option<String>,
    #[serde(default)]
    pub payload: Payload,
}

impl EffectSpec {
    pub fn build(&self) -> TimedEffect {
        let mut effect = if self.maintained {
            TimedEffect::maintained(&self.id, &self.source, self.kind, self.duration_secs)
        } else {
            TimedEffect::timed(&self.id, &self.source, self.kind, self.duration_secs)
        };
        if let Some(period_ms) = self.period_ms {
            effect = effect.with_periodic(period_ms, self.tag.as_deref());
        }
        if let Some(element) = &self.element {
            effect = effect.with_element(element);
        }
        effect.with_payload(self.payload.clone())
    }
}
