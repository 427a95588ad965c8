// rust/ttlc-config/src/env.rs
// Environment variable overrides (highest precedence)

use crate::schema::{ConfigError, TtlcConfig};

/// Apply `TTLC_*` overrides on top of `config`.
///
/// Recognized variables: TTLC_ARENA_SIZE, TTLC_ARENA_GUARD_PAGES,
/// TTLC_OTEL_ENDPOINT, TTLC_CYCLES_PER_TICK, TTLC_TICK_BUDGET,
/// TTLC_STRICT, TTLC_NO_VALIDATE.
pub fn apply_env_overrides(config: &mut TtlcConfig) -> Result<(), ConfigError> {
    if let Ok(v) = std::env::var("TTLC_ARENA_SIZE") {
        config.arena.size = parse_usize("TTLC_ARENA_SIZE", &v)?;
    }
    if let Ok(v) = std::env::var("TTLC_ARENA_GUARD_PAGES") {
        config.arena.guard_pages = parse_bool("TTLC_ARENA_GUARD_PAGES", &v)?;
    }
    if let Ok(v) = std::env::var("TTLC_OTEL_ENDPOINT") {
        config.telemetry.endpoint = if v.is_empty() { None } else { Some(v) };
    }
    if let Ok(v) = std::env::var("TTLC_CYCLES_PER_TICK") {
        config.telemetry.cycles_per_tick = parse_u64("TTLC_CYCLES_PER_TICK", &v)?;
    }
    if let Ok(v) = std::env::var("TTLC_TICK_BUDGET") {
        config.telemetry.tick_budget = parse_u64("TTLC_TICK_BUDGET", &v)?;
    }
    if let Ok(v) = std::env::var("TTLC_STRICT") {
        config.compile.strict = parse_bool("TTLC_STRICT", &v)?;
    }
    if let Ok(v) = std::env::var("TTLC_NO_VALIDATE") {
        config.compile.skip_validation = parse_bool("TTLC_NO_VALIDATE", &v)?;
    }
    Ok(())
}

fn parse_usize(name: &str, v: &str) -> Result<usize, ConfigError> {
    v.parse()
        .map_err(|_| ConfigError::Validation(format!("invalid {name}: {v:?}")))
}

fn parse_u64(name: &str, v: &str) -> Result<u64, ConfigError> {
    v.parse()
        .map_err(|_| ConfigError::Validation(format!("invalid {name}: {v:?}")))
}

fn parse_bool(name: &str, v: &str) -> Result<bool, ConfigError> {
    match v {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Validation(format!("invalid {name}: {v:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Env-var tests mutate process state; keep them in one test so
    // they cannot race each other.
    #[test]
    fn test_env_overrides() {
        std::env::set_var("TTLC_ARENA_SIZE", "8192");
        std::env::set_var("TTLC_TICK_BUDGET", "7");
        std::env::set_var("TTLC_STRICT", "true");
        let mut config = TtlcConfig::default();
        apply_env_overrides(&mut config).unwrap();
        assert_eq!(config.arena.size, 8192);
        assert_eq!(config.telemetry.tick_budget, 7);
        assert!(config.compile.strict);

        std::env::set_var("TTLC_TICK_BUDGET", "not-a-number");
        let mut config = TtlcConfig::default();
        assert!(apply_env_overrides(&mut config).is_err());

        std::env::remove_var("TTLC_ARENA_SIZE");
        std::env::remove_var("TTLC_TICK_BUDGET");
        std::env::remove_var("TTLC_STRICT");
    }
}
