//! Timed effect instances (runtime state)
//!
//! A `TimedEffect` lives on the actor it was applied to (its owner).
//! The actor that applied it is recorded as metadata only.
//!
//! # Removal
//!
//! An effect is removed when EITHER:
//! 1. The caller removes it explicitly (`TimingEngine::remove_effect`)
//! 2. Its countdown reaches zero while counting down
//!
//! Post-stop effects linked to an active channel never reach (2) until the
//! channel stops.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cadence_types::{DurationModel, EffectKind};

use crate::actors::ActorId;
use crate::clock::Millis;

/// Opaque effect payload. The engine routes it, never reads it.
pub type Payload = BTreeMap<String, toml::Value>;

/// Remaining time below this counts as expired
const EXPIRY_EPSILON_SECS: f64 = 1e-9;

/// Pulse tag for maintained aura effects
pub const AURA_PULSE_TAG: &str = "AURA_PULSE";

/// Pulse tag for damage/heal-over-time effects
pub const DOT_TICK_TAG: &str = "DOT_TICK";

/// Recurring pulse attached to an effect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Periodic {
    pub period_ms: Millis,
    #[serde(default)]
    pub accumulated_ms: Millis,
    #[serde(default)]
    pub tag: Option<String>,
}

impl Periodic {
    pub fn new(period_ms: Millis, tag: Option<String>) -> Self {
        Self {
            period_ms,
            accumulated_ms: 0,
            tag,
        }
    }

    /// Add elapsed time and return how many full periods were consumed.
    /// A zero period never pulses.
    pub fn accumulate(&mut self, dt_ms: Millis) -> u64 {
        if self.period_ms == 0 {
            return 0;
        }
        self.accumulated_ms = self.accumulated_ms.saturating_add(dt_ms);
        let pulses = self.accumulated_ms / self.period_ms;
        self.accumulated_ms %= self.period_ms;
        pulses
    }
}

/// A buff, debuff, damage/heal-over-time or aura applied to an actor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEffect {
    pub id: String,

    /// Who applied it (metadata only)
    pub source_actor_id: ActorId,

    pub kind: EffectKind,

    #[serde(default)]
    pub element: Option<String>,

    #[serde(default)]
    pub payload: Payload,

    // ─── Duration ───────────────────────────────────────────────────────────
    pub duration_model: DurationModel,

    pub remaining_secs: f64,

    /// False while frozen by an active channel
    pub counting_down: bool,

    /// Reference point for elapsed-time calculations.
    /// Reset to the stop instant when a linked channel stops.
    #[serde(default)]
    pub started_at_ms: Millis,

    // ─── Pulses ─────────────────────────────────────────────────────────────
    #[serde(default)]
    pub periodic: Option<Periodic>,
}

impl TimedEffect {
    /// Normal-duration effect that starts counting down immediately
    pub fn timed(
        id: impl Into<String>,
        source_actor_id: impl Into<ActorId>,
        kind: EffectKind,
        duration_secs: f64,
    ) -> Self {
        Self {
            id: id.into(),
            source_actor_id: source_actor_id.into(),
            kind,
            element: None,
            payload: Payload::new(),
            duration_model: DurationModel::Normal,
            remaining_secs: duration_secs,
            counting_down: true,
            started_at_ms: 0,
            periodic: None,
        }
    }

    /// Post-stop effect, frozen until the channel it is linked to stops
    pub fn maintained(
        id: impl Into<String>,
        source_actor_id: impl Into<ActorId>,
        kind: EffectKind,
        duration_secs: f64,
    ) -> Self {
        Self {
            duration_model: DurationModel::PostStop,
            counting_down: false,
            ..Self::timed(id, source_actor_id, kind, duration_secs)
        }
    }

    /// Attach a pulse spec. Ignored for a zero period.
    pub fn with_periodic(mut self, period_ms: Millis, tag: Option<&str>) -> Self {
        if period_ms > 0 {
            self.periodic = Some(Periodic::new(period_ms, tag.map(str::to_string)));
        }
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    pub fn with_element(mut self, element: impl Into<String>) -> Self {
        self.element = Some(element.into());
        self
    }

    pub fn is_post_stop(&self) -> bool {
        self.duration_model == DurationModel::PostStop
    }

    pub fn freeze(&mut self) {
        self.counting_down = false;
    }

    /// Resume the countdown, measuring elapsed time from `now_ms`
    pub fn unfreeze(&mut self, now_ms: Millis) {
        self.counting_down = true;
        self.started_at_ms = now_ms;
    }

    /// Consume `dt_ms` of duration if counting down.
    /// Returns true once the effect has run out.
    pub fn tick_countdown(&mut self, dt_ms: Millis) -> bool {
        if !self.counting_down {
            return false;
        }
        self.remaining_secs = (self.remaining_secs - dt_ms as f64 / 1000.0).max(0.0);
        if self.remaining_secs < EXPIRY_EPSILON_SECS {
            self.remaining_secs = 0.0;
        }
        self.remaining_secs <= 0.0
    }
}
