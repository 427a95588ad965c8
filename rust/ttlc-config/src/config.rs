// rust/ttlc-config/src/config.rs
// Configuration loading and validation

use std::path::{Path, PathBuf};

use crate::env::apply_env_overrides;
use crate::schema::{ConfigError, TtlcConfig};

/// Smallest arena the pipeline will accept from configuration.
const MIN_ARENA: usize = 4096;
/// Largest arena: identifiers into it stay 32-bit addressable.
const MAX_ARENA: usize = 1 << 32;

/// Load configuration: file (when present), then environment
/// overrides, then validation.
pub fn load_config() -> Result<TtlcConfig, ConfigError> {
    let path = config_file_path();
    let mut config = match path {
        Some(p) if p.exists() => load_from_file(&p)?,
        _ => TtlcConfig::default(),
    };
    apply_env_overrides(&mut config)?;
    validate_config(&config)?;
    Ok(config)
}

pub fn load_from_file(path: &Path) -> Result<TtlcConfig, ConfigError> {
    let content =
        std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
    toml::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))
}

/// `TTLC_CONFIG` wins; otherwise `~/.ttlc/config.toml`.
fn config_file_path() -> Option<PathBuf> {
    if let Ok(explicit) = std::env::var("TTLC_CONFIG") {
        return Some(PathBuf::from(explicit));
    }
    let home = std::env::var("HOME").ok()?;
    let mut path = PathBuf::from(home);
    path.push(".ttlc");
    path.push("config.toml");
    Some(path)
}

pub fn validate_config(config: &TtlcConfig) -> Result<(), ConfigError> {
    if config.arena.size < MIN_ARENA || config.arena.size > MAX_ARENA {
        return Err(ConfigError::Validation(format!(
            "arena.size {} outside [{MIN_ARENA}, {MAX_ARENA}]",
            config.arena.size
        )));
    }
    if config.telemetry.cycles_per_tick == 0 {
        return Err(ConfigError::Validation(
            "telemetry.cycles_per_tick must be at least 1".to_string(),
        ));
    }
    if config.telemetry.tick_budget == 0 {
        return Err(ConfigError::Validation(
            "telemetry.tick_budget must be at least 1".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let config = TtlcConfig::default();
        assert!(validate_config(&config).is_ok());
        assert_eq!(config.telemetry.tick_budget, 8);
        assert_eq!(config.telemetry.cycles_per_tick, 4);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[arena]\nsize = 8388608\nguard_pages = true\n\n[telemetry]\ntick_budget = 7\n",
        )
        .unwrap();
        let config = load_from_file(&path).unwrap();
        assert_eq!(config.arena.size, 8 << 20);
        assert!(config.arena.guard_pages);
        assert_eq!(config.telemetry.tick_budget, 7);
        // Untouched sections keep defaults.
        assert_eq!(config.telemetry.cycles_per_tick, 4);
    }

    #[test]
    fn test_bad_arena_size_rejected() {
        let mut config = TtlcConfig::default();
        config.arena.size = 16;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_unknown_keys_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[arena]\nsizzle = 1\n").unwrap();
        assert!(matches!(
            load_from_file(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
