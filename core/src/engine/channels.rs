//! Channel manager: open/close maintained activities and freeze or
//! release the post-stop effects linked to them.

use cadence_types::{EffectKind, UpkeepRates};

use crate::channels::{Channel, Upkeep};
use crate::effects::{AURA_PULSE_TAG, Payload, TimedEffect};
use crate::signals::{CombatSignal, StopReason};

use super::TimingEngine;

impl TimingEngine {
    /// Open (or reopen) a channel and freeze every post-stop effect linked
    /// to it. Emits `ChannelStart` only when the channel was not already
    /// active.
    ///
    /// Upkeep given for an existing channel replaces its rates; the
    /// accumulator carries over.
    pub fn start_channel(&mut self, source_id: &str, channel_id: &str, upkeep: Option<UpkeepRates>) {
        let Some(actor) = self.actors.get_mut(source_id) else {
            tracing::debug!(actor = %source_id, channel = %channel_id, "start_channel on unknown actor");
            return;
        };

        let channel = actor
            .channels
            .entry(channel_id.to_string())
            .or_insert_with(|| Channel::new(channel_id, source_id, upkeep));

        if let Some(rates) = upkeep {
            match channel.upkeep.as_mut() {
                Some(existing) => existing.rates = rates,
                None => channel.upkeep = Some(Upkeep::new(rates)),
            }
        }

        let was_active = channel.active;
        channel.active = true;

        for effect_id in &channel.effect_ids {
            if let Some(effect) = actor.effects.get_mut(effect_id) {
                if effect.is_post_stop() {
                    effect.freeze();
                }
            }
        }

        if !was_active {
            tracing::debug!(actor = %source_id, channel = %channel_id, "channel started");
            self.bus.emit(CombatSignal::ChannelStart {
                source_id: source_id.to_string(),
                channel_id: channel_id.to_string(),
            });
        }
    }

    /// Associate an effect on `source_id` with one of its channels. If the
    /// channel is active and the effect is post-stop, it freezes at once.
    /// Returns false when the channel does not exist.
    pub fn link_effect_to_channel(&mut self, source_id: &str, channel_id: &str, effect_id: &str) -> bool {
        let Some(actor) = self.actors.get_mut(source_id) else {
            return false;
        };
        let Some(channel) = actor.channels.get_mut(channel_id) else {
            tracing::debug!(actor = %source_id, channel = %channel_id, effect = %effect_id, "link to unknown channel ignored");
            return false;
        };

        channel.link(effect_id);
        if channel.active {
            if let Some(effect) = actor.effects.get_mut(effect_id) {
                if effect.is_post_stop() {
                    effect.freeze();
                }
            }
        }
        true
    }

    /// Stop an active channel, releasing its post-stop effects to count
    /// down from now. Stopping an inactive or unknown channel does nothing.
    pub fn stop_channel(&mut self, source_id: &str, channel_id: &str) -> bool {
        self.deactivate_channel(source_id, channel_id, StopReason::Manual)
    }

    pub(super) fn deactivate_channel(&mut self, source_id: &str, channel_id: &str, reason: StopReason) -> bool {
        let now = self.clock.now_ms();
        let Some(actor) = self.actors.get_mut(source_id) else {
            return false;
        };
        let Some(channel) = actor.channels.get_mut(channel_id) else {
            return false;
        };
        if !channel.active {
            return false;
        }
        channel.active = false;
        let linked = channel.effect_ids.clone();

        // Effects still held by another active channel stay frozen
        for effect_id in &linked {
            if actor.active_channels().any(|c| c.is_linked(effect_id)) {
                continue;
            }
            if let Some(effect) = actor.effects.get_mut(effect_id) {
                if effect.is_post_stop() {
                    effect.unfreeze(now);
                }
            }
        }

        match reason {
            StopReason::Manual => {
                tracing::debug!(actor = %source_id, channel = %channel_id, "channel stopped")
            }
            StopReason::Exhausted => {
                tracing::info!(actor = %source_id, channel = %channel_id, "channel stopped: upkeep exhausted")
            }
        }
        self.bus.emit(CombatSignal::ChannelStop {
            source_id: source_id.to_string(),
            channel_id: channel_id.to_string(),
            reason,
        });
        true
    }

    /// Delete a channel outright, stopping it first if needed
    pub fn discard_channel(&mut self, source_id: &str, channel_id: &str) -> Option<Channel> {
        self.stop_channel(source_id, channel_id);
        self.actors.get_mut(source_id)?.channels.remove(channel_id)
    }

    pub fn is_channel_active(&self, source_id: &str, channel_id: &str) -> bool {
        self.actors
            .get(source_id)
            .and_then(|a| a.channel(channel_id))
            .is_some_and(|c| c.active)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Maintained activities
    // ─────────────────────────────────────────────────────────────────────────

    /// Start a song: open the channel and add a linked post-stop aura on the
    /// singer that pulses every `aura_pulse_default_ms`.
    pub fn start_maintained_song(
        &mut self,
        singer_id: &str,
        channel_id: &str,
        effect_id: &str,
        duration_secs: f64,
        payload: Payload,
        upkeep_mp_per_5s: f64,
    ) {
        let upkeep = Some(UpkeepRates::mp(upkeep_mp_per_5s)).filter(|r| !r.is_free());
        self.start_channel(singer_id, channel_id, upkeep);

        let aura = TimedEffect::maintained(effect_id, singer_id, EffectKind::Aura, duration_secs)
            .with_periodic(self.config.aura_pulse_default_ms, Some(AURA_PULSE_TAG))
            .with_payload(payload);
        self.add_effect(singer_id, aura, Some(channel_id));
    }

    /// Open `summon:{summon_id}` with MP upkeep and link the attached
    /// effects so they hold while the summon is maintained.
    /// Returns the channel id.
    pub fn spawn_summon_as_channel(
        &mut self,
        summoner_id: &str,
        summon_id: &str,
        upkeep_mp_per_5s: f64,
        attached: Vec<TimedEffect>,
    ) -> String {
        let channel_id = format!("summon:{}", summon_id);
        self.start_channel(summoner_id, &channel_id, Some(UpkeepRates::mp(upkeep_mp_per_5s)));
        for effect in attached {
            self.add_effect(summoner_id, effect, Some(&channel_id));
        }
        channel_id
    }
}
