//! Shared configuration types for Cadence
//!
//! This crate contains serializable types that are shared between the
//! engine (cadence-core) and the scenario validator (cadence-validate).

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Engine Configuration
// ─────────────────────────────────────────────────────────────────────────────

fn default_gcd_ms() -> u64 {
    1000
}

fn default_period_ms() -> u64 {
    5000
}

fn default_true() -> bool {
    true
}

/// Timing constants for a `TimingEngine` instance.
///
/// Every field has a serde default so partial TOML files only override
/// what they name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Global cooldown applied when an ability does not override it
    #[serde(default = "default_gcd_ms")]
    pub gcd_ms: u64,

    /// Standard damage/heal-over-time pulse interval
    #[serde(default = "default_period_ms")]
    pub dot_regen_period_ms: u64,

    /// Default pulse interval for maintained auras (songs, dances)
    #[serde(default = "default_period_ms")]
    pub aura_pulse_default_ms: u64,

    /// Interval between channel upkeep drains
    #[serde(default = "default_period_ms")]
    pub upkeep_tick_ms: u64,

    /// Buffer emitted signals until the driver drains them.
    /// Disable for long headless runs that only use subscribers.
    #[serde(default = "default_true")]
    pub retain_signals: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gcd_ms: default_gcd_ms(),
            dot_regen_period_ms: default_period_ms(),
            aura_pulse_default_ms: default_period_ms(),
            upkeep_tick_ms: default_period_ms(),
            retain_signals: true,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Combatants
// ─────────────────────────────────────────────────────────────────────────────

/// Which side of a fight a combatant is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    #[default]
    PlayerParty,
    Enemy,
    Neutral,
}

/// Resource pools of a single combatant.
///
/// The engine never stores these; it reaches them through a caller-supplied
/// accessor during upkeep drains.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ResourcePool {
    #[serde(default)]
    pub hp: f64,
    #[serde(default)]
    pub mp: f64,
    #[serde(default)]
    pub stamina: f64,
    #[serde(default)]
    pub hp_max: f64,
    #[serde(default)]
    pub mp_max: f64,
    #[serde(default)]
    pub stamina_max: f64,
}

impl ResourcePool {
    /// Pool with every current value at its maximum
    pub fn full(hp_max: f64, mp_max: f64, stamina_max: f64) -> Self {
        Self {
            hp: hp_max,
            mp: mp_max,
            stamina: stamina_max,
            hp_max,
            mp_max,
            stamina_max,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Effects & Channels
// ─────────────────────────────────────────────────────────────────────────────

/// Broad category of a timed effect. Routed to subscribers, never
/// interpreted by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    #[default]
    Buff,
    Debuff,
    Dot,
    Regen,
    Control,
    Resist,
    Weakness,
    Shield,
    Aura,
    Ultimate,
}

/// How an effect's duration is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DurationModel {
    /// Countdown starts immediately and runs continuously
    #[default]
    Normal,
    /// Countdown is frozen while a linked channel is active
    PostStop,
}

/// Per-tick resource cost of keeping a channel up.
///
/// Named "per 5s" after the standard tick; the actual interval is
/// `EngineConfig::upkeep_tick_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UpkeepRates {
    #[serde(default)]
    pub mp_per_5s: f64,
    #[serde(default)]
    pub stamina_per_5s: f64,
    #[serde(default)]
    pub hp_per_5s: f64,
}

impl UpkeepRates {
    pub fn mp(mp_per_5s: f64) -> Self {
        Self {
            mp_per_5s,
            ..Self::default()
        }
    }

    /// True when no pool is drained at all
    pub fn is_free(&self) -> bool {
        self.mp_per_5s <= 0.0 && self.stamina_per_5s <= 0.0 && self.hp_per_5s <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg: EngineConfig = toml::from_str("gcd_ms = 1500").unwrap();
        assert_eq!(cfg.gcd_ms, 1500);
        assert_eq!(cfg.upkeep_tick_ms, 5000);
        assert!(cfg.retain_signals);
    }

    #[test]
    fn enums_use_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            faction: Faction,
            model: DurationModel,
            kind: EffectKind,
        }
        let w: Wrapper =
            toml::from_str("faction = \"player_party\"\nmodel = \"post_stop\"\nkind = \"aura\"")
                .unwrap();
        assert_eq!(w.faction, Faction::PlayerParty);
        assert_eq!(w.model, DurationModel::PostStop);
        assert_eq!(w.kind, EffectKind::Aura);
    }

    #[test]
    fn free_upkeep() {
        assert!(UpkeepRates::default().is_free());
        assert!(!UpkeepRates::mp(10.0).is_free());
    }
}
