mod types;

pub use types::*;

use anyhow::{Context, Result};
use mediaprobe_core::Tool;
use std::path::{Path, PathBuf};

/// Default configuration locations, in lookup order.
pub const DEFAULT_PATHS: [&str; 3] = [
    "./mediaprobe.toml",
    "~/.config/mediaprobe/config.toml",
    "/etc/mediaprobe/config.toml",
];

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    expand_tool_paths(&mut config);
    validate_config(&config);

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    for path_str in DEFAULT_PATHS {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Expand a leading `~` in every configured tool path.
fn expand_tool_paths(config: &mut Config) {
    for tool in Tool::ALL {
        let Some(path) = config.tools.get(tool) else {
            continue;
        };
        let Some(raw) = path.to_str() else {
            continue;
        };
        let expanded = PathBuf::from(shellexpand::tilde(raw).as_ref());
        config.tools.set(tool, expanded);
    }
}

/// Configured tool paths that do not exist only produce a warning, since
/// lookup falls back to `PATH`.
fn validate_config(config: &Config) {
    for tool in Tool::ALL {
        if let Some(path) = config.tools.get(tool) {
            if !path.exists() {
                tracing::warn!(
                    "Configured {} path does not exist, will search PATH: {:?}",
                    tool,
                    path
                );
            }
        }
    }
}
