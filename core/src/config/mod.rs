//! Engine configuration loading
//!
//! `EngineConfig` itself lives in cadence-types. This module reads it from
//! TOML; missing fields fall back to their defaults.

mod error;

use std::path::{Path, PathBuf};

pub use cadence_types::EngineConfig;
pub use error::ConfigError;

const INLINE_SOURCE: &str = "<inline>";

/// Load and validate an engine config file
pub fn load_config(path: &Path) -> Result<EngineConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_from(&content, path)
}

/// Parse and validate config TOML held in memory
pub fn parse_config(content: &str) -> Result<EngineConfig, ConfigError> {
    parse_config_from(content, Path::new(INLINE_SOURCE))
}

fn parse_config_from(content: &str, path: &Path) -> Result<EngineConfig, ConfigError> {
    let config: EngineConfig = toml::from_str(content).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })?;
    validate(&config, path)?;
    tracing::debug!(path = %path.display(), ?config, "engine config loaded");
    Ok(config)
}

/// Reject values that would stall the engine
pub fn validate(config: &EngineConfig, path: &Path) -> Result<(), ConfigError> {
    let invalid = |reason: &str| ConfigError::Invalid {
        path: PathBuf::from(path),
        reason: reason.to_string(),
    };
    if config.upkeep_tick_ms == 0 {
        return Err(invalid("upkeep_tick_ms must be greater than zero"));
    }
    if config.dot_regen_period_ms == 0 {
        return Err(invalid("dot_regen_period_ms must be greater than zero"));
    }
    if config.aura_pulse_default_ms == 0 {
        return Err(invalid("aura_pulse_default_ms must be greater than zero"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(parse_config("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn test_partial_override() {
        let config = parse_config("gcd_ms = 1500\nupkeep_tick_ms = 2500").unwrap();
        assert_eq!(config.gcd_ms, 1500);
        assert_eq!(config.upkeep_tick_ms, 2500);
        assert_eq!(config.aura_pulse_default_ms, 5000);
    }

    #[test]
    fn test_zero_tick_rejected() {
        let err = parse_config("upkeep_tick_ms = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_bad_toml_rejected() {
        let err = parse_config("gcd_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, ConfigError::ParseToml { .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }
}
