//! File-based configuration for CLI defaults.
//!
//! Values in the config file fill in defaults only; command-line flags
//! always win. A missing file is not an error, a malformed or out-of-range
//! file is.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// JSON-backed configuration defaults.
///
/// Every field is optional; absent fields fall back to built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// Root of the media library tree.
    pub library_root: Option<PathBuf>,
    /// Concurrent transfer limit (1..=20).
    pub concurrency: Option<u8>,
    /// Seconds between progress updates (1..=3600).
    pub progress_interval_secs: Option<u64>,
    /// Connection establishment budget in seconds (1..=3600).
    pub connect_timeout_secs: Option<u64>,
    /// Stalled-read budget in seconds (1..=3600).
    pub read_timeout_secs: Option<u64>,
    /// Allow HTTPS certificate failures to retry over plain HTTP.
    pub insecure_fallback: Option<bool>,
}

impl FileConfig {
    /// Validates config values against runtime and CLI constraints.
    ///
    /// # Errors
    ///
    /// Returns an error naming the offending key and the expected range.
    pub fn validate(&self) -> Result<()> {
        if let Some(concurrency) = self.concurrency
            && !(1..=20).contains(&concurrency)
        {
            bail!("Invalid config value for `concurrency`: {concurrency}. Expected range: 1..=20");
        }
        validate_secs("progress_interval_secs", self.progress_interval_secs)?;
        validate_secs("connect_timeout_secs", self.connect_timeout_secs)?;
        validate_secs("read_timeout_secs", self.read_timeout_secs)?;
        Ok(())
    }
}

fn validate_secs(field: &str, value: Option<u64>) -> Result<()> {
    let Some(value) = value else {
        return Ok(());
    };
    if !(1..=3600).contains(&value) {
        bail!("Invalid config value for `{field}`: {value}. Expected range: 1..=3600");
    }
    Ok(())
}

/// Loaded config metadata.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Resolved config path if a base directory is known.
    pub path: Option<PathBuf>,
    /// Parsed file config when a config file exists and was valid.
    pub config: Option<FileConfig>,
}

/// Resolves the default config path.
///
/// Priority:
/// 1. `$XDG_CONFIG_HOME/mediafetch/config.json`
/// 2. `$HOME/.config/mediafetch/config.json`
#[must_use]
pub fn resolve_default_config_path() -> Option<PathBuf> {
    if let Some(xdg_config_home) = env_var_non_empty_os("XDG_CONFIG_HOME") {
        return Some(
            PathBuf::from(xdg_config_home)
                .join("mediafetch")
                .join("config.json"),
        );
    }

    let home = env_var_non_empty_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("mediafetch")
            .join("config.json"),
    )
}

fn env_var_non_empty_os(name: &str) -> Option<std::ffi::OsString> {
    let value = env::var_os(name)?;
    if value.is_empty() { None } else { Some(value) }
}

/// Loads config from the default path if one exists.
///
/// # Errors
///
/// Returns an error when the file exists but cannot be read, parsed, or
/// validated.
pub fn load_default_file_config() -> Result<LoadedConfig> {
    let path = resolve_default_config_path();
    let Some(path_ref) = path.as_deref() else {
        return Ok(LoadedConfig { path, config: None });
    };

    if !path_ref.exists() {
        return Ok(LoadedConfig { path, config: None });
    }

    let config = load_file_config(path_ref)?;
    Ok(LoadedConfig {
        path,
        config: Some(config),
    })
}

/// Loads and validates a config file at an explicit path.
///
/// # Errors
///
/// Returns an error when the file cannot be read, parsed, or validated.
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
    let config: FileConfig = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
    config.validate()?;
    Ok(config)
}
