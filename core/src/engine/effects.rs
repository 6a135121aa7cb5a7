//! Effect lifecycle: install, remove, and per-tick pulses and countdown

use crate::clock::Millis;
use crate::effects::TimedEffect;
use crate::signals::CombatSignal;

use super::TimingEngine;

impl TimingEngine {
    /// Install an effect on its owner, replacing any effect with the same id.
    /// The periodic accumulator restarts from zero. If `link_channel` names
    /// one of the owner's channels the effect is linked to it immediately.
    ///
    /// A post-stop effect that ends up held by no active channel counts
    /// down from now like a normal one.
    pub fn add_effect(&mut self, owner_id: &str, mut effect: TimedEffect, link_channel: Option<&str>) {
        let now = self.clock.now_ms();
        let Some(actor) = self.actors.get_mut(owner_id) else {
            tracing::debug!(actor = %owner_id, effect = %effect.id, "add_effect on unknown actor");
            return;
        };

        if let Some(periodic) = effect.periodic.as_mut() {
            periodic.accumulated_ms = 0;
        }
        effect.started_at_ms = now;
        let effect_id = effect.id.clone();
        tracing::trace!(actor = %owner_id, effect = %effect_id, remaining_secs = effect.remaining_secs, "effect added");
        actor.effects.insert(effect_id.clone(), effect);

        if let Some(channel_id) = link_channel {
            self.link_effect_to_channel(owner_id, channel_id, &effect_id);
        }

        let Some(actor) = self.actors.get_mut(owner_id) else {
            return;
        };
        let held = actor.active_channels().any(|c| c.is_linked(&effect_id));
        if let Some(effect) = actor.effects.get_mut(&effect_id) {
            if effect.is_post_stop() && !held {
                effect.unfreeze(now);
            }
        }
    }

    /// Delete an effect and unlink it from every channel on the owner
    pub fn remove_effect(&mut self, owner_id: &str, effect_id: &str) -> Option<TimedEffect> {
        self.actors.get_mut(owner_id)?.remove_effect(effect_id)
    }

    pub fn effect(&self, owner_id: &str, effect_id: &str) -> Option<&TimedEffect> {
        self.actors.get(owner_id)?.effect(effect_id)
    }

    /// Pulses first, then countdown. The two are independent: a frozen
    /// aura keeps pulsing on schedule.
    pub(super) fn advance_effects(&mut self, actor_id: &str, dt_ms: Millis) {
        let Some(actor) = self.actors.get_mut(actor_id) else {
            return;
        };

        let mut expired = Vec::new();
        for effect in actor.effects.values_mut() {
            if let Some(periodic) = effect.periodic.as_mut() {
                let pulses = periodic.accumulate(dt_ms);
                for _ in 0..pulses {
                    self.bus.emit(CombatSignal::EffectPulse {
                        owner_id: actor_id.to_string(),
                        effect_id: effect.id.clone(),
                        tag: periodic.tag.clone(),
                    });
                }
            }

            if effect.tick_countdown(dt_ms) {
                expired.push(effect.id.clone());
            }
        }

        for effect_id in expired {
            actor.remove_effect(&effect_id);
            tracing::trace!(actor = %actor_id, effect = %effect_id, "effect expired");
            self.bus.emit(CombatSignal::EffectExpired {
                owner_id: actor_id.to_string(),
                effect_id,
            });
        }
    }
}
