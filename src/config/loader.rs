//! Configuration loading and discovery for `ppmview.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::ViewerConfig;
use crate::resize::ScaleFilter;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name searched for when discovering configuration.
pub const CONFIG_FILE_NAME: &str = "ppmview.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse ppmview.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override aspect ratio locking
    pub keep_aspect_ratio: Option<bool>,
    /// Override resampling filter
    pub filter: Option<ScaleFilter>,
    /// Override watch debounce
    pub debounce_ms: Option<u32>,
    /// Override screen clearing in watch mode
    pub clear_screen: Option<bool>,
}

/// Find ppmview.toml by walking up from the current working directory.
///
/// Search order:
/// 1. Walk up from current directory looking for ppmview.toml
/// 2. Check XDG_CONFIG_HOME/ppmview/ppmview.toml (or ~/.config/ppmview/ppmview.toml)
pub fn find_config() -> Option<PathBuf> {
    if let Ok(cwd) = env::current_dir() {
        if let Some(path) = find_config_from(cwd) {
            return Some(path);
        }
    }

    find_xdg_config()
}

/// Find ppmview.toml in the XDG config directory.
pub fn find_xdg_config() -> Option<PathBuf> {
    let xdg_config = env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok()?;

    let config_path = xdg_config.join("ppmview").join(CONFIG_FILE_NAME);
    if config_path.exists() {
        Some(config_path)
    } else {
        None
    }
}

/// Find ppmview.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from a ppmview.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the defaults.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("viewer/ppmview.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<ViewerConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            log::debug!("loading config from {}", p.display());
            load_config_file(&p)
        }
        None => Ok(ViewerConfig::default()),
    }
}

fn load_config_file(path: &Path) -> Result<ViewerConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let config: ViewerConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    Ok(config)
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut ViewerConfig, overrides: &CliOverrides) {
    if let Some(keep) = overrides.keep_aspect_ratio {
        config.view.keep_aspect_ratio = keep;
    }
    if let Some(filter) = overrides.filter {
        config.view.filter = filter;
    }
    if let Some(debounce_ms) = overrides.debounce_ms {
        config.watch.debounce_ms = debounce_ms;
    }
    if let Some(clear_screen) = overrides.clear_screen {
        config.watch.clear_screen = clear_screen;
    }
}
