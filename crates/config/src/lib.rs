//! Configuration loading, env substitution, and validation.
//!
//! Config files: `voxrelay.toml`, `voxrelay.yaml`, or `voxrelay.json`
//! Searched in `./` then `~/.config/voxrelay/`.
//!
//! Supports `${ENV_VAR}` substitution in all string values, and
//! `VOXRELAY_*` environment overrides applied after parsing.

pub mod env_subst;
pub mod loader;
pub mod schema;
pub mod validate;

pub use {
    loader::{
        ConfigError, apply_env_overrides, config_dir, discover_and_load, find_config_file,
        load_config,
    },
    schema::{ServerConfig, VoxrelayConfig},
    validate::{Diagnostic, Severity, ValidationResult, validate},
};
