//! Configuration loading and discovery for `gridpaint.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::GridpaintConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the config file looked up in the working tree.
pub const CONFIG_FILE: &str = "gridpaint.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse gridpaint.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub cell_size: Option<u32>,
    pub max_extent: Option<usize>,
    pub tick_rate: Option<u32>,
}

/// Find gridpaint.toml by walking up from the current working directory,
/// falling back to `$XDG_CONFIG_HOME/gridpaint/gridpaint.toml`.
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find gridpaint.toml in the XDG config directory.
///
/// Checks XDG_CONFIG_HOME/gridpaint/gridpaint.toml or ~/.config/gridpaint/gridpaint.toml
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("gridpaint").join(CONFIG_FILE);
    config_path.exists().then_some(config_path)
}

/// Find gridpaint.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration.
///
/// An explicit path must exist. Without one, the discovered config is used,
/// or the defaults if none is found.
pub fn load_config(path: Option<&Path>) -> Result<GridpaintConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(GridpaintConfig::default()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<GridpaintConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: GridpaintConfig = toml::from_str(&contents)?;
    check(&config)?;
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

fn check(config: &GridpaintConfig) -> Result<(), ConfigError> {
    let errors = config.validate();
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()))
    }
}

/// Merge CLI overrides into a configuration and re-validate it.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(
    config: &mut GridpaintConfig,
    overrides: &CliOverrides,
) -> Result<(), ConfigError> {
    if let Some(cell_size) = overrides.cell_size {
        config.editor.cell_size = cell_size;
    }
    if let Some(max_extent) = overrides.max_extent {
        config.editor.max_extent = max_extent;
    }
    if let Some(tick_rate) = overrides.tick_rate {
        config.editor.tick_rate = tick_rate;
    }
    check(config)
}
