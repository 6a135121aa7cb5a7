//! Drives a scenario's steps through a fresh `TimingEngine`

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use cadence_core::{
    ActorState, CastRequest, CombatSignal, ResourcePool, SignalHandler, TimingEngine,
};

use crate::output::CliOutput;
use crate::scenario::{Scenario, Step};
use crate::verification::{CheckpointVerifier, Observed, VerificationResult};

/// Subscriber that buffers signals for the runner to print and count
#[derive(Debug, Clone, Default)]
pub struct SignalRecorder {
    signals: Rc<RefCell<Vec<CombatSignal>>>,
}

impl SignalRecorder {
    pub fn drain(&self) -> Vec<CombatSignal> {
        std::mem::take(&mut *self.signals.borrow_mut())
    }
}

impl SignalHandler for SignalRecorder {
    fn handle_signal(&mut self, signal: &CombatSignal) {
        self.signals.borrow_mut().push(signal.clone());
    }
}

/// Outcome of a full scenario run
#[derive(Debug)]
pub struct RunReport {
    pub end_ms: u64,
    pub verification: VerificationResult,
    pub unexpected_rejections: u32,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.verification.passed() && self.unexpected_rejections == 0
    }
}

pub struct ScenarioRunner {
    engine: TimingEngine,
    pools: BTreeMap<String, ResourcePool>,
    recorder: SignalRecorder,
    /// Signal counts since the last checkpoint
    signal_counts: BTreeMap<String, usize>,
    verifier: CheckpointVerifier,
    strict: bool,
    unexpected_rejections: u32,
}

impl ScenarioRunner {
    pub fn new(scenario: &Scenario) -> Self {
        let mut config = scenario.config.clone();
        // The recorder sees everything; the engine need not buffer too
        config.retain_signals = false;

        let mut engine = TimingEngine::new(config);
        let recorder = SignalRecorder::default();
        engine.subscribe(recorder.clone());

        let mut pools = BTreeMap::new();
        for spec in &scenario.actors {
            let mut actor = ActorState::new(spec.id.as_str(), spec.faction);
            actor.alive = spec.alive;
            engine.upsert_actor(actor);
            if let Some(pool) = spec.pools {
                pools.insert(spec.id.clone(), pool);
            }
        }

        Self {
            engine,
            pools,
            recorder,
            signal_counts: BTreeMap::new(),
            verifier: CheckpointVerifier::new(scenario.meta.tolerance_secs),
            strict: scenario.meta.strict,
            unexpected_rejections: 0,
        }
    }

    pub fn run(mut self, steps: &[Step], out: &mut CliOutput) -> RunReport {
        for (index, step) in steps.iter().enumerate() {
            out.step(self.engine.now_ms(), index, step.kind());
            self.apply(step, out);
        }
        out.flush();

        RunReport {
            end_ms: self.engine.now_ms(),
            verification: self.verifier.finalize(),
            unexpected_rejections: self.unexpected_rejections,
        }
    }

    pub fn apply(&mut self, step: &Step, out: &mut CliOutput) {
        match step {
            Step::Advance { ms, frame_ms } => {
                let frame = frame_ms.filter(|f| *f > 0).unwrap_or(*ms);
                let mut remaining = *ms;
                while remaining > 0 {
                    let dt = frame.min(remaining);
                    self.engine.advance_with(dt, &mut self.pools);
                    self.flush_signals(out);
                    remaining -= dt;
                }
            }
            Step::StartCast {
                actor,
                ability,
                cast_time_ms,
                targets,
                gcd_ms,
                opens_channel,
                expect_rejected,
            } => {
                let mut request = CastRequest::new(ability.as_str())
                    .cast_time_ms(*cast_time_ms)
                    .targets(targets.iter().cloned());
                if let Some(gcd) = gcd_ms {
                    request = request.gcd_ms(*gcd);
                }
                if let Some(channel) = opens_channel {
                    request = request.opens_channel(channel.as_str());
                }

                match self.engine.start_cast(actor, request) {
                    Ok(()) => {
                        if *expect_rejected {
                            tracing::warn!(actor = %actor, ability = %ability, "cast expected to be rejected was accepted");
                            self.note_unexpected();
                        }
                    }
                    Err(rejection) => {
                        out.rejection(self.engine.now_ms(), ability, &rejection, *expect_rejected);
                        if !*expect_rejected {
                            self.note_unexpected();
                        }
                    }
                }
            }
            Step::CancelCast { actor } => {
                self.engine.cancel_cast(actor);
            }
            Step::SetCooldown { actor, ability, ms } => {
                self.engine.set_cooldown(actor, ability, *ms);
            }
            Step::StartChannel { actor, channel, upkeep } => {
                self.engine.start_channel(actor, channel, *upkeep);
            }
            Step::StopChannel { actor, channel } => {
                self.engine.stop_channel(actor, channel);
            }
            Step::StartSong {
                singer,
                channel,
                effect,
                duration_secs,
                upkeep_mp_per_5s,
                payload,
            } => {
                self.engine.start_maintained_song(
                    singer,
                    channel,
                    effect,
                    *duration_secs,
                    payload.clone(),
                    *upkeep_mp_per_5s,
                );
            }
            Step::SpawnSummon {
                summoner,
                summon,
                upkeep_mp_per_5s,
                effects,
            } => {
                let attached = effects.iter().map(|e| e.build()).collect();
                self.engine
                    .spawn_summon_as_channel(summoner, summon, *upkeep_mp_per_5s, attached);
            }
            Step::AddEffect { owner, effect, channel } => {
                self.engine.add_effect(owner, effect.build(), channel.as_deref());
            }
            Step::RemoveEffect { owner, effect } => {
                self.engine.remove_effect(owner, effect);
            }
            Step::SetAlive { actor, alive } => {
                self.engine.set_alive(actor, *alive);
            }
            Step::Publish { signal } => {
                self.engine.publish(signal.clone());
            }
            Step::Checkpoint(checkpoint) => {
                self.flush_signals(out);
                let result = self.verifier.verify(
                    checkpoint,
                    Observed {
                        engine: &self.engine,
                        pools: &self.pools,
                        signal_counts: &self.signal_counts,
                    },
                );
                out.checkpoint(result);
                self.signal_counts.clear();
                return;
            }
        }
        self.flush_signals(out);
    }

    fn note_unexpected(&mut self) {
        if self.strict {
            self.unexpected_rejections += 1;
        }
    }

    fn flush_signals(&mut self, out: &mut CliOutput) {
        let now = self.engine.now_ms();
        for signal in self.recorder.drain() {
            *self.signal_counts.entry(signal.name().to_string()).or_default() += 1;
            out.signal(now, &signal);
        }
    }
}
