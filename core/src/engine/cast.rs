//! Cast / cooldown state machine
//!
//! Instant casts reserve the global cooldown when they start. Timed casts
//! reserve it when they complete, so interrupting a long cast does not
//! waste the GCD.

use crate::actors::{ActiveCast, ActorId, CastState, Cooldown};
use crate::clock::Millis;
use crate::signals::CombatSignal;

use super::{CastRejection, EngineCommand, TimingEngine};

/// Parameters of a cast attempt
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CastRequest {
    pub ability_id: String,
    pub target_ids: Vec<ActorId>,
    /// Zero for instant abilities
    pub cast_time_ms: Millis,
    /// Replaces `EngineConfig::gcd_ms` for this cast
    pub gcd_override_ms: Option<Millis>,
    /// Channel opened as a direct consequence of completing the cast
    pub opens_channel: Option<String>,
}

impl CastRequest {
    pub fn new(ability_id: impl Into<String>) -> Self {
        Self {
            ability_id: ability_id.into(),
            ..Self::default()
        }
    }

    pub fn targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ActorId>,
    {
        self.target_ids = targets.into_iter().map(Into::into).collect();
        self
    }

    pub fn cast_time_ms(mut self, cast_time_ms: Millis) -> Self {
        self.cast_time_ms = cast_time_ms;
        self
    }

    pub fn gcd_ms(mut self, gcd_ms: Millis) -> Self {
        self.gcd_override_ms = Some(gcd_ms);
        self
    }

    pub fn opens_channel(mut self, channel_id: impl Into<String>) -> Self {
        self.opens_channel = Some(channel_id.into());
        self
    }
}

impl TimingEngine {
    /// Begin a cast. Rejections leave every piece of state untouched.
    pub fn start_cast(&mut self, actor_id: &str, request: CastRequest) -> Result<(), CastRejection> {
        let now = self.clock.now_ms();
        let default_gcd = self.config.gcd_ms;

        let Some(actor) = self.actors.get_mut(actor_id) else {
            tracing::debug!(actor = %actor_id, ability = %request.ability_id, "cast rejected: unknown actor");
            return Err(CastRejection::UnknownActor {
                actor_id: actor_id.to_string(),
            });
        };

        if !actor.alive {
            tracing::debug!(actor = %actor_id, ability = %request.ability_id, "cast rejected: dead");
            return Err(CastRejection::Dead {
                actor_id: actor_id.to_string(),
            });
        }
        if now < actor.gcd_ends_at_ms {
            let remaining_ms = actor.gcd_ends_at_ms - now;
            tracing::debug!(actor = %actor_id, ability = %request.ability_id, remaining_ms, "cast rejected: global cooldown");
            return Err(CastRejection::GlobalCooldown {
                actor_id: actor_id.to_string(),
                remaining_ms,
            });
        }
        if let Some(current) = actor.cast.active() {
            tracing::debug!(actor = %actor_id, ability = %request.ability_id, casting = %current.ability_id, "cast rejected: already casting");
            return Err(CastRejection::AlreadyCasting {
                actor_id: actor_id.to_string(),
                ability_id: current.ability_id.clone(),
            });
        }

        let gcd_ms = request.gcd_override_ms.unwrap_or(default_gcd);
        if request.cast_time_ms == 0 {
            actor.gcd_ends_at_ms = now.saturating_add(gcd_ms);
        }

        let due = now.saturating_add(request.cast_time_ms);
        let completion_id = format!("cast:{}:{}:{}", actor_id, request.ability_id, due);

        tracing::debug!(
            actor = %actor_id,
            ability = %request.ability_id,
            cast_time_ms = request.cast_time_ms,
            due,
            "cast started"
        );

        actor.cast = CastState::Casting(ActiveCast {
            ability_id: request.ability_id,
            caster_id: actor_id.to_string(),
            target_ids: request.target_ids,
            cast_time_ms: request.cast_time_ms,
            started_at_ms: now,
            gcd_ms,
            opens_channel: request.opens_channel,
            completion_id: completion_id.clone(),
        });

        self.timeline.schedule(
            completion_id,
            due,
            EngineCommand::CompleteCast {
                actor_id: actor_id.to_string(),
            },
        );
        Ok(())
    }

    /// Reset the actor to idle and drop its pending completion so a
    /// cancelled cast can never complete later. Returns whether a cast
    /// was actually in progress.
    pub fn cancel_cast(&mut self, actor_id: &str) -> bool {
        let Some(actor) = self.actors.get_mut(actor_id) else {
            return false;
        };
        let CastState::Casting(cast) = std::mem::take(&mut actor.cast) else {
            return false;
        };
        self.timeline.cancel(&cast.completion_id);
        tracing::debug!(actor = %actor_id, ability = %cast.ability_id, "cast cancelled");
        true
    }

    /// Timeline callback for a due cast
    pub(super) fn complete_cast(&mut self, actor_id: &str, call_id: &str) {
        let now = self.clock.now_ms();
        let Some(actor) = self.actors.get_mut(actor_id) else {
            return;
        };

        // Only the cast that scheduled this call may complete
        let matches = actor
            .cast
            .active()
            .is_some_and(|cast| cast.completion_id == call_id);
        if !matches {
            tracing::trace!(actor = %actor_id, call = %call_id, "stale cast completion ignored");
            return;
        }
        let CastState::Casting(cast) = std::mem::take(&mut actor.cast) else {
            return;
        };

        if !cast.is_instant() {
            actor.gcd_ends_at_ms = now.saturating_add(cast.gcd_ms);
        }

        tracing::debug!(actor = %actor_id, ability = %cast.ability_id, "cast complete");
        self.bus.emit(CombatSignal::CastComplete {
            caster_id: actor_id.to_string(),
            ability_id: cast.ability_id,
            target_ids: cast.target_ids,
        });

        if let Some(channel_id) = cast.opens_channel {
            self.start_channel(actor_id, &channel_id, None);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Cooldowns
    // ─────────────────────────────────────────────────────────────────────────

    pub fn set_cooldown(&mut self, actor_id: &str, ability_id: &str, cd_ms: Millis) {
        let now = self.clock.now_ms();
        let Some(actor) = self.actors.get_mut(actor_id) else {
            tracing::debug!(actor = %actor_id, ability = %ability_id, "set_cooldown on unknown actor");
            return;
        };
        actor.cooldowns.insert(
            ability_id.to_string(),
            Cooldown {
                ability_id: ability_id.to_string(),
                ends_at_ms: now.saturating_add(cd_ms),
            },
        );
    }

    pub fn is_on_cooldown(&self, actor_id: &str, ability_id: &str) -> bool {
        self.cooldown_remaining_ms(actor_id, ability_id) > 0
    }

    /// Zero when ready, unknown, or never used
    pub fn cooldown_remaining_ms(&self, actor_id: &str, ability_id: &str) -> Millis {
        let now = self.clock.now_ms();
        self.actors
            .get(actor_id)
            .and_then(|a| a.cooldowns.get(ability_id))
            .map(|cd| cd.ends_at_ms.saturating_sub(now))
            .unwrap_or(0)
    }

    /// Time left on the actor's global cooldown
    pub fn gcd_remaining_ms(&self, actor_id: &str) -> Millis {
        let now = self.clock.now_ms();
        self.actors
            .get(actor_id)
            .map(|a| a.gcd_ends_at_ms.saturating_sub(now))
            .unwrap_or(0)
    }
}
