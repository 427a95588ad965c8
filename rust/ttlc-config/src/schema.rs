// rust/ttlc-config/src/schema.rs
// Configuration schema and defaults

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("config i/o error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("config validation error: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ArenaConfig {
    /// Lexeme arena size in bytes
    pub size: usize,
    pub guard_pages: bool,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        ArenaConfig {
            size: 16 << 20,
            guard_pages: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct TelemetryConfig {
    pub endpoint: Option<String>,
    pub cycles_per_tick: u64,
    pub tick_budget: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        TelemetryConfig {
            endpoint: None,
            cycles_per_tick: 4,
            tick_budget: 8,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct CompileConfig {
    pub strict: bool,
    pub skip_validation: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct TtlcConfig {
    pub arena: ArenaConfig,
    pub telemetry: TelemetryConfig,
    pub compile: CompileConfig,
}
