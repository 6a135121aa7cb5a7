//! Checkpoint-based engine verification
//!
//! A checkpoint step lists the state the engine should be in at that point
//! of the scenario. The verifier compares it against what the engine
//! actually holds and collects readable failure messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cadence_core::{ResourcePool, TimingEngine};

const POOL_EPSILON: f64 = 1e-6;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRef {
    pub actor: String,
    pub channel: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EffectRef {
    pub owner: String,
    pub id: String,
}

/// Expected effect on an actor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedEffect {
    pub owner: String,
    pub id: String,

    /// Checked within the scenario tolerance
    #[serde(default)]
    pub remaining_secs: Option<f64>,

    #[serde(default)]
    pub counting_down: Option<bool>,
}

/// Expected pool values; omitted pools are not checked
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedPool {
    pub actor: String,
    #[serde(default)]
    pub hp: Option<f64>,
    #[serde(default)]
    pub mp: Option<f64>,
    #[serde(default)]
    pub stamina: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedCooldown {
    pub actor: String,
    pub ability: String,
    pub remaining_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpectedCast {
    pub actor: String,
    pub casting: bool,
    #[serde(default)]
    pub ability: Option<String>,
}

/// Expected engine state at one point of a scenario
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub now_ms: Option<u64>,

    #[serde(default)]
    pub channels_active: Vec<ChannelRef>,

    #[serde(default)]
    pub channels_inactive: Vec<ChannelRef>,

    #[serde(default)]
    pub effects: Vec<ExpectedEffect>,

    #[serde(default)]
    pub effects_absent: Vec<EffectRef>,

    #[serde(default)]
    pub pools: Vec<ExpectedPool>,

    #[serde(default)]
    pub cooldowns: Vec<ExpectedCooldown>,

    #[serde(default)]
    pub casting: Vec<ExpectedCast>,

    /// Signal counts by name, since the previous checkpoint
    #[serde(default)]
    pub signals: BTreeMap<String, usize>,
}

/// What the runner observed when it reached a checkpoint
#[derive(Debug, Clone, Copy)]
pub struct Observed<'a> {
    pub engine: &'a TimingEngine,
    pub pools: &'a BTreeMap<String, ResourcePool>,
    pub signal_counts: &'a BTreeMap<String, usize>,
}

/// Result of verifying a single checkpoint
#[derive(Debug, Clone)]
pub struct CheckpointResult {
    pub checkpoint_idx: usize,
    pub name: Option<String>,
    pub at_ms: u64,
    pub passed: bool,
    pub failures: Vec<String>,
}

/// Overall verification result
#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub checkpoints_passed: u32,
    pub checkpoints_total: u32,
    pub results: Vec<CheckpointResult>,
}

impl VerificationResult {
    pub fn passed(&self) -> bool {
        self.checkpoints_passed == self.checkpoints_total
    }
}

/// Verifies engine state against checkpoints as a scenario runs
#[derive(Debug)]
pub struct CheckpointVerifier {
    tolerance_secs: f64,
    results: Vec<CheckpointResult>,
}

impl CheckpointVerifier {
    pub fn new(tolerance_secs: f64) -> Self {
        Self {
            tolerance_secs,
            results: Vec::new(),
        }
    }

    pub fn verify(&mut self, checkpoint: &Checkpoint, observed: Observed<'_>) -> &CheckpointResult {
        let engine = observed.engine;
        let mut failures = Vec::new();

        if let Some(expected) = checkpoint.now_ms {
            if engine.now_ms() != expected {
                failures.push(format!(
                    "Clock at {}ms, expected {}ms",
                    engine.now_ms(),
                    expected
                ));
            }
        }

        for c in &checkpoint.channels_active {
            if !engine.is_channel_active(&c.actor, &c.channel) {
                failures.push(format!(
                    "Channel '{}' on '{}' should be active but is not",
                    c.channel, c.actor
                ));
            }
        }
        for c in &checkpoint.channels_inactive {
            if engine.is_channel_active(&c.actor, &c.channel) {
                failures.push(format!(
                    "Channel '{}' on '{}' should be inactive but is active",
                    c.channel, c.actor
                ));
            }
        }

        for expected in &checkpoint.effects {
            let Some(effect) = engine.effect(&expected.owner, &expected.id) else {
                failures.push(format!(
                    "Effect '{}' should be on '{}' but is not",
                    expected.id, expected.owner
                ));
                continue;
            };
            if let Some(remaining) = expected.remaining_secs {
                if (effect.remaining_secs - remaining).abs() > self.tolerance_secs {
                    failures.push(format!(
                        "Effect '{}' on '{}' has {:.3}s remaining, expected {:.3}s",
                        expected.id, expected.owner, effect.remaining_secs, remaining
                    ));
                }
            }
            if let Some(counting) = expected.counting_down {
                if effect.counting_down != counting {
                    failures.push(format!(
                        "Effect '{}' on '{}' should be {}",
                        expected.id,
                        expected.owner,
                        if counting { "counting down" } else { "frozen" }
                    ));
                }
            }
        }
        for e in &checkpoint.effects_absent {
            if engine.effect(&e.owner, &e.id).is_some() {
                failures.push(format!("Effect '{}' should be gone from '{}'", e.id, e.owner));
            }
        }

        for expected in &checkpoint.pools {
            let Some(pool) = observed.pools.get(&expected.actor) else {
                failures.push(format!("Actor '{}' has no resource pools", expected.actor));
                continue;
            };
            let checks = [
                ("hp", expected.hp, pool.hp),
                ("mp", expected.mp, pool.mp),
                ("stamina", expected.stamina, pool.stamina),
            ];
            for (label, want, got) in checks {
                if let Some(want) = want {
                    if (got - want).abs() > POOL_EPSILON {
                        failures.push(format!(
                            "Actor '{}' {} is {}, expected {}",
                            expected.actor, label, got, want
                        ));
                    }
                }
            }
        }

        for expected in &checkpoint.cooldowns {
            let remaining = engine.cooldown_remaining_ms(&expected.actor, &expected.ability);
            if remaining != expected.remaining_ms {
                failures.push(format!(
                    "Cooldown '{}' on '{}' has {}ms left, expected {}ms",
                    expected.ability, expected.actor, remaining, expected.remaining_ms
                ));
            }
        }

        for expected in &checkpoint.casting {
            let cast = engine.actor(&expected.actor).and_then(|a| a.cast.active());
            match (expected.casting, cast) {
                (true, None) => failures.push(format!("Actor '{}' should be casting", expected.actor)),
                (false, Some(cast)) => failures.push(format!(
                    "Actor '{}' should be idle but is casting '{}'",
                    expected.actor, cast.ability_id
                )),
                (true, Some(cast)) => {
                    if let Some(ability) = &expected.ability {
                        if &cast.ability_id != ability {
                            failures.push(format!(
                                "Actor '{}' is casting '{}', expected '{}'",
                                expected.actor, cast.ability_id, ability
                            ));
                        }
                    }
                }
                (false, None) => {}
            }
        }

        for (name, want) in &checkpoint.signals {
            let got = observed.signal_counts.get(name).copied().unwrap_or(0);
            if got != *want {
                failures.push(format!("Signal '{}' seen {} times, expected {}", name, got, want));
            }
        }

        let result = CheckpointResult {
            checkpoint_idx: self.results.len(),
            name: checkpoint.name.clone(),
            at_ms: engine.now_ms(),
            passed: failures.is_empty(),
            failures,
        };
        self.results.push(result);
        &self.results[self.results.len() - 1]
    }

    pub fn finalize(self) -> VerificationResult {
        let passed = self.results.iter().filter(|r| r.passed).count() as u32;
        let total = self.results.len() as u32;

        VerificationResult {
            checkpoints_passed: passed,
            checkpoints_total: total,
            results: self.results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{ActorState, EffectKind, Faction, TimedEffect};

    fn make_engine() -> TimingEngine {
        let mut engine = TimingEngine::default();
        engine.upsert_actor(ActorState::new("bard", Faction::PlayerParty));
        engine.start_channel("bard", "song:1", None);
        engine.add_effect(
            "bard",
            TimedEffect::maintained("valor", "bard", EffectKind::Aura, 10.0),
            Some("song:1"),
        );
        engine
    }

    fn observe<'a>(
        engine: &'a TimingEngine,
        pools: &'a BTreeMap<String, ResourcePool>,
        counts: &'a BTreeMap<String, usize>,
    ) -> Observed<'a> {
        Observed {
            engine,
            pools,
            signal_counts: counts,
        }
    }

    #[test]
    fn test_checkpoint_pass() {
        let engine = make_engine();
        let pools = BTreeMap::from([("bard".to_string(), ResourcePool::full(100.0, 50.0, 0.0))]);
        let counts = BTreeMap::from([("channel_start".to_string(), 1)]);

        let checkpoint = Checkpoint {
            name: Some("song up".into()),
            now_ms: Some(0),
            channels_active: vec![ChannelRef {
                actor: "bard".into(),
                channel: "song:1".into(),
            }],
            effects: vec![ExpectedEffect {
                owner: "bard".into(),
                id: "valor".into(),
                remaining_secs: Some(10.0),
                counting_down: Some(false),
            }],
            pools: vec![ExpectedPool {
                actor: "bard".into(),
                hp: None,
                mp: Some(50.0),
                stamina: None,
            }],
            signals: BTreeMap::from([("channel_start".to_string(), 1)]),
            ..Default::default()
        };

        let mut verifier = CheckpointVerifier::new(0.001);
        let result = verifier.verify(&checkpoint, observe(&engine, &pools, &counts));
        assert!(result.passed, "Failures: {:?}", result.failures);
        assert!(verifier.finalize().passed());
    }

    #[test]
    fn test_checkpoint_fail_collects_every_mismatch() {
        let engine = make_engine();
        let pools = BTreeMap::new();
        let counts = BTreeMap::new();

        let checkpoint = Checkpoint {
            channels_inactive: vec![ChannelRef {
                actor: "bard".into(),
                channel: "song:1".into(),
            }],
            effects_absent: vec![EffectRef {
                owner: "bard".into(),
                id: "valor".into(),
            }],
            casting: vec![ExpectedCast {
                actor: "bard".into(),
                casting: true,
                ability: None,
            }],
            signals: BTreeMap::from([("channel_stop".to_string(), 1)]),
            ..Default::default()
        };

        let mut verifier = CheckpointVerifier::new(0.001);
        let result = verifier.verify(&checkpoint, observe(&engine, &pools, &counts));
        assert!(!result.passed);
        assert_eq!(result.failures.len(), 4, "{:?}", result.failures);
        assert!(result.failures.iter().any(|f| f.contains("should be inactive")));

        let summary = verifier.finalize();
        assert_eq!(summary.checkpoints_passed, 0);
        assert_eq!(summary.checkpoints_total, 1);
    }

    #[test]
    fn test_remaining_outside_tolerance() {
        let engine = make_engine();
        let pools = BTreeMap::new();
        let counts = BTreeMap::new();
        let checkpoint = Checkpoint {
            effects: vec![ExpectedEffect {
                owner: "bard".into(),
                id: "valor".into(),
                remaining_secs: Some(9.5),
                counting_down: None,
            }],
            ..Default::default()
        };

        let mut verifier = CheckpointVerifier::new(0.001);
        let result = verifier.verify(&checkpoint, observe(&engine, &pools, &counts));
        assert!(result.failures[0].contains("remaining"));

        let mut lenient = CheckpointVerifier::new(1.0);
        assert!(lenient.verify(&checkpoint, observe(&engine, &pools, &counts)).passed);
    }
}
