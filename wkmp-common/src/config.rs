//! Configuration file resolution and loading
//!
//! Config file resolution follows a fixed priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. Per-user config directory (`~/.config/wkmp/<file>`)
//! 4. System-wide config directory (`/etc/wkmp/<file>`, Linux only)
//!
//! A missing config file is never fatal: callers receive compiled defaults
//! and a warning is logged.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Logging section shared by every service's TOML file
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Locates a service's TOML config file
#[derive(Debug, Clone)]
pub struct ConfigFileResolver {
    file_name: String,
    env_var_name: String,
}

impl ConfigFileResolver {
    /// `file_name` is looked up under the `wkmp` config directory,
    /// `env_var_name` may hold an explicit path.
    pub fn new(file_name: impl Into<String>, env_var_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            env_var_name: env_var_name.into(),
        }
    }

    /// Resolve the config file path, or `None` when no candidate exists
    pub fn resolve(&self, cli_arg: Option<&Path>) -> Option<PathBuf> {
        // Priority 1: Command-line argument (returned even if missing so the
        // caller can report it)
        if let Some(path) = cli_arg {
            return Some(path.to_path_buf());
        }

        // Priority 2: Environment variable
        if let Ok(path) = std::env::var(&self.env_var_name) {
            if !path.trim().is_empty() {
                return Some(PathBuf::from(path));
            }
        }

        // Priority 3: Per-user config directory
        if let Some(user_config) = dirs::config_dir().map(|d| d.join("wkmp").join(&self.file_name))
        {
            if user_config.exists() {
                return Some(user_config);
            }
        }

        // Priority 4: System-wide config (Linux)
        if cfg!(target_os = "linux") {
            let system_config = PathBuf::from("/etc/wkmp").join(&self.file_name);
            if system_config.exists() {
                return Some(system_config);
            }
        }

        None
    }
}

/// Parse a TOML document into `T`
pub fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T> {
    Ok(toml::from_str(content)?)
}

/// Load `T` from a TOML file, falling back to `T::default()` when the path
/// is `None` or the file does not exist. A file that exists but cannot be
/// read or parsed is an error.
pub fn load_toml_or_default<T>(path: Option<&Path>) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(path) = path else {
        warn!("No config file found, using built-in defaults");
        return Ok(T::default());
    };

    if !path.exists() {
        warn!("Config file {} not found, using built-in defaults", path.display());
        return Ok(T::default());
    }

    let content = std::fs::read_to_string(path)?;
    let config = parse_toml(&content).map_err(|e| {
        Error::Config(format!("Failed to parse {}: {}", path.display(), e))
    })?;
    info!("Loaded config from {}", path.display());
    Ok(config)
}

/// Read an environment variable, treating empty values as unset
pub fn env_override(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
