//! Scenario files
//!
//! A scenario describes a cast of actors and an ordered list of steps to
//! drive through a `TimingEngine`, with checkpoints asserting on the state
//! reached along the way.

mod step;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cadence_core::{ConfigError, EngineConfig, Faction, ResourcePool};

pub use step::{EffectSpec, Step};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to read scenario file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse scenario TOML in {path}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid scenario {path}: {reason}")]
    Invalid { path: PathBuf, reason: String },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Full scenario file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    pub meta: ScenarioMeta,

    /// Engine config; fields left out keep their defaults
    #[serde(default)]
    pub config: EngineConfig,

    #[serde(default, rename = "actor")]
    pub actors: Vec<ActorSpec>,

    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioMeta {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Fail the run when a cast is rejected
    #[serde(default)]
    pub strict: bool,

    /// Tolerance in seconds for remaining-duration comparisons
    #[serde(default = "default_tolerance")]
    pub tolerance_secs: f64,
}

fn default_tolerance() -> f64 {
    0.001
}

fn default_alive() -> bool {
    true
}

/// An actor registered before the first step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorSpec {
    pub id: String,

    #[serde(default)]
    pub faction: Faction,

    #[serde(default = "default_alive")]
    pub alive: bool,

    /// Resource pools drained by channel upkeep. Actors without pools
    /// accumulate upkeep time but are never charged.
    #[serde(default)]
    pub pools: Option<ResourcePool>,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self, ScenarioError> {
        let content = std::fs::read_to_string(path).map_err(|source| ScenarioError::ReadFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(content).map_err(|source| ScenarioError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
        cadence_core::config::validate(&scenario.config, path)?;
        scenario.check_actor_ids(path)?;
        Ok(scenario)
    }

    fn check_actor_ids(&self, path: &Path) -> Result<(), ScenarioError> {
        let mut seen = std::collections::BTreeSet::new();
        for actor in &self.actors {
            if !seen.insert(actor.id.as_str()) {
                return Err(ScenarioError::Invalid {
                    path: path.to_path_buf(),
                    reason: format!("actor '{}' declared twice", actor.id),
                });
            }
        }
        Ok(())
    }

    pub fn checkpoint_count(&self) -> usize {
        self.steps
            .iter()
            .filter(|s| matches!(s, Step::Checkpoint(_)))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SONG: &str = r#"
        [meta]
        name = "song upkeep"
        strict = true

        [config]
        upkeep_tick_ms = 5000

        [[actor]]
        id = "bard"
        pools = { mp = 25.0, mp_max = 100.0 }

        [[actor]]
        id = "wolf"
        faction = "enemy"

        [[step]]
        type = "start_song"
        singer = "bard"
        channel = "song:valor"
        effect = "valor"
        duration_secs = 6.0
        upkeep_mp_per_5s = 10.0

        [[step]]
        type = "advance"
        ms = 15000
        frame_ms = 5000

        [[step]]
        type = "checkpoint"
        name = "exhausted"
        channels_inactive = [{ actor = "bard", channel = "song:valor" }]
        pools = [{ actor = "bard", mp = 0.0 }]
        signals = { channel_stop = 1 }
    "#;

    fn parse(content: &str) -> Result<Scenario, ScenarioError> {
        Scenario::parse(content, Path::new("test.toml"))
    }

    #[test]
    fn test_parse_full_scenario() {
        let scenario = parse(SONG).unwrap();
        assert_eq!(scenario.meta.name, "song upkeep");
        assert!(scenario.meta.strict);
        assert_eq!(scenario.meta.tolerance_secs, 0.001);
        assert_eq!(scenario.config.upkeep_tick_ms, 5000);
        assert_eq!(scenario.config.gcd_ms, 1000);

        assert_eq!(scenario.actors.len(), 2);
        assert_eq!(scenario.actors[0].pools.unwrap().mp, 25.0);
        assert_eq!(scenario.actors[1].faction, Faction::Enemy);
        assert!(scenario.actors[1].alive);
        assert!(scenario.actors[1].pools.is_none());

        assert_eq!(scenario.steps.len(), 3);
        assert!(matches!(
            scenario.steps[1],
            Step::Advance { ms: 15000, frame_ms: Some(5000) }
        ));
        assert_eq!(scenario.checkpoint_count(), 1);
    }

    #[test]
    fn test_duplicate_actor_rejected() {
        let content = r#"
            [meta]
            name = "dup"
            [[actor]]
            id = "a"
            [[actor]]
            id = "a"
        "#;
        assert!(matches!(parse(content), Err(ScenarioError::Invalid { .. })));
    }

    #[test]
    fn test_invalid_engine_config_rejected() {
        let content = r#"
            [meta]
            name = "bad tick"
            [config]
            upkeep_tick_ms = 0
        "#;
        assert!(matches!(
            parse(content),
            Err(ScenarioError::Config(ConfigError::Invalid { .. }))
        ));
    }

    #[test]
    fn test_unknown_step_rejected() {
        let content = r#"
            [meta]
            name = "typo"
            [[step]]
            type = "advence"
            ms = 10
        "#;
        assert!(matches!(parse(content), Err(ScenarioError::ParseToml { .. })));
    }
}
