//! Configuration loading, env substitution, and validation.
//!
//! Config files: `weft.toml`, `weft.yaml`, or `weft.json`
//! Searched in `./` then `~/.config/weft/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{apply_env_overrides, config_dir, discover_and_load, find_config_file, load_config},
    schema::{
        AnthropicConfig, DEFAULT_ANTHROPIC_API_URL, DEFAULT_MAX_TOKENS, DiscoveryConfig,
        WeftConfig,
    },
    validate::{Diagnostic, Severity, ValidationResult, validate_config, validate_file},
};
