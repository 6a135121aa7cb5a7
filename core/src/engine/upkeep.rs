//! Channel upkeep: periodic resource drain and exhaustion auto-stop

use crate::clock::Millis;
use crate::resources::{ResourceAccess, drain_upkeep_tick};
use crate::signals::StopReason;

use super::TimingEngine;

impl TimingEngine {
    /// Charge upkeep for the actor's active channels.
    ///
    /// Every full `upkeep_tick_ms` consumed debits one tick. A channel whose
    /// drained pool hits zero is stopped at once and charged no further.
    pub(super) fn drain_upkeep(
        &mut self,
        actor_id: &str,
        dt_ms: Millis,
        resources: &mut Option<&mut dyn ResourceAccess>,
    ) {
        let tick_ms = self.config.upkeep_tick_ms;
        let Some(actor) = self.actors.get_mut(actor_id) else {
            return;
        };

        let mut exhausted = Vec::new();
        for channel in actor.channels.values_mut() {
            if !channel.active {
                continue;
            }
            let Some(upkeep) = channel.upkeep.as_mut() else {
                continue;
            };
            let ticks = upkeep.accumulate(dt_ms, tick_ms);
            if ticks == 0 {
                continue;
            }
            let Some(pool) = resources.as_mut().and_then(|r| r.pool_mut(actor_id)) else {
                tracing::trace!(actor = %actor_id, channel = %channel.id, "no resource pool, upkeep skipped");
                continue;
            };

            for _ in 0..ticks {
                if drain_upkeep_tick(pool, &upkeep.rates) {
                    exhausted.push(channel.id.clone());
                    break;
                }
            }
            tracing::trace!(actor = %actor_id, channel = %channel.id, ticks, mp = pool.mp, "upkeep drained");
        }

        for channel_id in exhausted {
            self.deactivate_channel(actor_id, &channel_id, StopReason::Exhausted);
        }
    }
}
