//! The timing engine
//!
//! Owns the clock, the timeline, the signal bus and the actor registry of a
//! single simulation. Independent engines share nothing.
//!
//! # Tick order
//!
//! ```text
//! advance(dt)
//!   1. clock += dt
//!   2. fire due timeline calls (cast completions, in due order)
//!   3. per living actor, in id order:
//!        a. drain channel upkeep (may auto-stop channels)
//!        b. advance effects (pulses, countdown, expiry)
//!   4. emit Tick
//! ```
//!
//! Later stages observe what earlier stages did in the same call: a cast
//! that completes and opens a channel in step 2 is already active in step 3,
//! with its upkeep accumulator starting from zero.

mod cast;
mod channels;
mod effects;
mod error;
mod upkeep;


use std::collections::BTreeMap;

use cadence_types::EngineConfig;

use crate::actors::{ActorId, ActorState, CastState};
use crate::clock::{Millis, SimClock};
use crate::resources::ResourceAccess;
use crate::signals::{CombatSignal, SignalBus, SignalHandler};
use crate::timeline::Timeline;

pub use cast::CastRequest;
pub use error::CastRejection;

/// Commands stored on the timeline and dispatched by the engine when due
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    CompleteCast { actor_id: ActorId },
}

/// Deterministic combat timing engine.
///
/// All mutation happens synchronously inside the public methods; nothing
/// runs in the background.
#[derive(Debug)]
pub struct TimingEngine {
    config: EngineConfig,
    clock: SimClock,
    timeline: Timeline<EngineCommand>,
    bus: SignalBus,
    actors: BTreeMap<ActorId, ActorState>,
}

impl Default for TimingEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl TimingEngine {
    pub fn new(config: EngineConfig) -> Self {
        let bus = SignalBus::new(config.retain_signals);
        Self {
            config,
            clock: SimClock::new(),
            timeline: Timeline::new(),
            bus,
            actors: BTreeMap::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    pub fn now_ms(&self) -> Millis {
        self.clock.now_ms()
    }

    pub fn timeline(&self) -> &Timeline<EngineCommand> {
        &self.timeline
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Signals
    // ─────────────────────────────────────────────────────────────────────────

    pub fn subscribe(&mut self, handler: impl SignalHandler + 'static) {
        self.bus.subscribe(handler);
    }

    /// Raise a signal from outside the engine (hits, crits, heals, kills)
    pub fn publish(&mut self, signal: CombatSignal) {
        self.bus.emit(signal);
    }

    /// Signals emitted since the last drain
    pub fn pending_signals(&self) -> &[CombatSignal] {
        self.bus.pending()
    }

    pub fn take_signals(&mut self) -> Vec<CombatSignal> {
        self.bus.take()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Actor registry
    // ─────────────────────────────────────────────────────────────────────────

    /// Insert or replace an actor. A replaced actor's pending cast
    /// completion is cancelled along with it.
    pub fn upsert_actor(&mut self, actor: ActorState) {
        let id = actor.id.clone();
        if let Some(previous) = self.actors.insert(id.clone(), actor) {
            self.forget_pending_cast(&previous.cast);
        }
        tracing::debug!(actor = %id, "actor registered");
    }

    /// Remove an actor and everything it owns
    pub fn remove_actor(&mut self, actor_id: &str) -> Option<ActorState> {
        let removed = self.actors.remove(actor_id)?;
        self.forget_pending_cast(&removed.cast);
        tracing::debug!(actor = %actor_id, "actor removed");
        Some(removed)
    }

    /// Dead actors are skipped by `advance` and cannot start casts.
    /// Their effects and channels stay in place until the caller removes them.
    pub fn set_alive(&mut self, actor_id: &str, alive: bool) {
        match self.actors.get_mut(actor_id) {
            Some(actor) => actor.alive = alive,
            None => tracing::debug!(actor = %actor_id, "set_alive on unknown actor"),
        }
    }

    pub fn actor(&self, actor_id: &str) -> Option<&ActorState> {
        self.actors.get(actor_id)
    }

    pub fn actor_mut(&mut self, actor_id: &str) -> Option<&mut ActorState> {
        self.actors.get_mut(actor_id)
    }

    pub fn actors(&self) -> impl Iterator<Item = &ActorState> {
        self.actors.values()
    }

    fn forget_pending_cast(&mut self, cast: &CastState) {
        if let Some(cast) = cast.active() {
            self.timeline.cancel(&cast.completion_id);
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Advance
    // ─────────────────────────────────────────────────────────────────────────

    /// Advance simulation time without resource access.
    /// Upkeep accumulators still run but nothing is drained.
    pub fn advance(&mut self, dt_ms: Millis) {
        self.advance_inner(dt_ms, None);
    }

    /// Advance simulation time, draining channel upkeep from `resources`
    pub fn advance_with(&mut self, dt_ms: Millis, resources: &mut dyn ResourceAccess) {
        self.advance_inner(dt_ms, Some(resources));
    }

    fn advance_inner(&mut self, dt_ms: Millis, mut resources: Option<&mut dyn ResourceAccess>) {
        if dt_ms == 0 {
            tracing::trace!("ignoring zero-length advance");
            return;
        }

        self.clock.advance(dt_ms);
        let now = self.clock.now_ms();

        while let Some(call) = self.timeline.pop_due(now) {
            self.dispatch(&call.id, call.command);
        }

        let living: Vec<ActorId> = self
            .actors
            .values()
            .filter(|a| a.alive)
            .map(|a| a.id.clone())
            .collect();

        for actor_id in &living {
            self.drain_upkeep(actor_id, dt_ms, &mut resources);
            self.advance_effects(actor_id, dt_ms);
        }

        self.bus.emit(CombatSignal::Tick { dt_ms, now_ms: now });
    }

    fn dispatch(&mut self, call_id: &str, command: EngineCommand) {
        match command {
            EngineCommand::CompleteCast { actor_id } => self.complete_cast(&actor_id, call_id),
        }
    }
}
