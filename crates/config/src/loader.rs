use std::path::{Path, PathBuf};

use {
    secrecy::Secret,
    thiserror::Error,
    tracing::{debug, warn},
};

use crate::{env_subst::substitute_env, schema::VoxrelayConfig};

/// Standard config file names, checked in order.
const CONFIG_FILENAMES: &[&str] = &[
    "voxrelay.toml",
    "voxrelay.yaml",
    "voxrelay.yml",
    "voxrelay.json",
];

/// Environment variables that override file values.
pub const ENV_API_KEY: &str = "VOXRELAY_API_KEY";
pub const ENV_BASE_URL: &str = "VOXRELAY_BASE_URL";
pub const ENV_BIND: &str = "VOXRELAY_BIND";
pub const ENV_PORT: &str = "VOXRELAY_PORT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    #[error("unsupported config format: .{0}")]
    UnsupportedFormat(String),
}

/// Load config from the given path (any supported format), then apply
/// environment overrides.
pub fn load_config(path: &Path) -> Result<VoxrelayConfig, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let raw = substitute_env(&raw);
    let mut config = parse_config(&raw, path)?;
    apply_env_overrides(&mut config);
    Ok(config)
}

/// Discover and load config from standard locations.
///
/// Search order:
/// 1. `./voxrelay.{toml,yaml,yml,json}` (project-local)
/// 2. `~/.config/voxrelay/voxrelay.{toml,yaml,yml,json}` (user-global)
///
/// Returns the config and the file it came from. Falls back to defaults
/// (plus environment overrides) only when no file is found; a file that
/// exists but cannot be loaded is an error.
pub fn discover_and_load() -> Result<(VoxrelayConfig, Option<PathBuf>), ConfigError> {
    load_discovered(find_config_file())
}

pub(crate) fn load_discovered(
    found: Option<PathBuf>,
) -> Result<(VoxrelayConfig, Option<PathBuf>), ConfigError> {
    let Some(path) = found else {
        debug!("no config file found, using defaults");
        let mut config = VoxrelayConfig::default();
        apply_env_overrides(&mut config);
        return Ok((config, None));
    };
    debug!(path = %path.display(), "loading config");
    let config = load_config(&path)?;
    Ok((config, Some(path)))
}

/// Find the first config file in standard locations.
pub fn find_config_file() -> Option<PathBuf> {
    for name in CONFIG_FILENAMES {
        let p = PathBuf::from(name);
        if p.exists() {
            return Some(p);
        }
    }

    let config_dir = config_dir()?;
    CONFIG_FILENAMES
        .iter()
        .map(|name| config_dir.join(name))
        .find(|p| p.exists())
}

/// Returns the user-global config directory (`~/.config/voxrelay/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "voxrelay").map(|d| d.config_dir().to_path_buf())
}

/// Apply `VOXRELAY_*` environment variables on top of `config`.
pub fn apply_env_overrides(config: &mut VoxrelayConfig) {
    apply_env_overrides_with(config, |name| std::env::var(name).ok());
}

pub(crate) fn apply_env_overrides_with(
    config: &mut VoxrelayConfig,
    lookup: impl Fn(&str) -> Option<String>,
) {
    let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

    if let Some(key) = lookup(ENV_API_KEY) {
        config.provider.api_key = Some(Secret::new(key));
    }
    if let Some(url) = lookup(ENV_BASE_URL) {
        config.provider.base_url = url;
    }
    if let Some(bind) = lookup(ENV_BIND) {
        config.server.bind = bind;
    }
    if let Some(port) = lookup(ENV_PORT) {
        match port.trim().parse() {
            Ok(port) => config.server.port = port,
            Err(_) => warn!(value = %port, "ignoring invalid {ENV_PORT}"),
        }
    }
}

fn parse_config(raw: &str, path: &Path) -> Result<VoxrelayConfig, ConfigError> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");
    let parse_err = |message: String| ConfigError::Parse {
        path: path.to_path_buf(),
        message,
    };

    match ext {
        "toml" => toml::from_str(raw).map_err(|e| parse_err(e.to_string())),
        "yaml" | "yml" => serde_yaml::from_str(raw).map_err(|e| parse_err(e.to_string())),
        "json" => serde_json::from_str(raw).map_err(|e| parse_err(e.to_string())),
        _ => Err(ConfigError::UnsupportedFormat(ext.to_string())),
    }
}
