// rust/ttlc-config/src/lib.rs
// Configuration management: TOML file with environment overrides
// Loading hierarchy: env > file > defaults

mod config;
mod env;
mod schema;

pub use config::{load_config, load_from_file, validate_config};
pub use env::apply_env_overrides;
pub use schema::{ArenaConfig, CompileConfig, ConfigError, TelemetryConfig, TtlcConfig};
