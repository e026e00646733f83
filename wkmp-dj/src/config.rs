//! wkmp-dj configuration
//!
//! Loaded from `dj.toml` (see [`wkmp_common::config::ConfigFileResolver`]),
//! with secrets overridable from the environment. Every field has a
//! built-in default so the service starts with no file at all; features
//! whose credentials are missing report themselves as unavailable.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use wkmp_common::config::{env_override, load_toml_or_default, ConfigFileResolver, LoggingConfig};

use crate::error::Result;

/// Config file name under the wkmp config directory
pub const CONFIG_FILE_NAME: &str = "dj.toml";

/// Environment variable holding an explicit config path
pub const CONFIG_ENV_VAR: &str = "WKMP_DJ_CONFIG";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DjConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sonos: SonosConfig,
    #[serde(default)]
    pub spotify: SpotifyConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// node-sonos-http-api connection
#[derive(Debug, Clone, Deserialize)]
pub struct SonosConfig {
    #[serde(default = "default_sonos_base_url")]
    pub base_url: String,
    /// Zone/room name, unencoded ("Dining Room")
    #[serde(default = "default_sonos_room")]
    pub room: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SonosConfig {
    fn default() -> Self {
        Self {
            base_url: default_sonos_base_url(),
            room: default_sonos_room(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpotifyConfig {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub client_secret: Option<String>,
    /// Long-lived user token from the OAuth authorization-code flow
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Default number of search results
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
}

impl Default for SpotifyConfig {
    fn default() -> Self {
        Self {
            client_id: None,
            client_secret: None,
            refresh_token: None,
            timeout_secs: default_timeout_secs(),
            search_limit: default_search_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl LlmConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5006
}

fn default_sonos_base_url() -> String {
    "http://localhost:5005".to_string()
}

fn default_sonos_room() -> String {
    "Dining Room".to_string()
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_search_limit() -> u32 {
    5
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    300
}

impl DjConfig {
    /// Resolve, load and apply environment overrides
    pub fn load(cli_path: Option<&Path>) -> Result<Self> {
        let path = ConfigFileResolver::new(CONFIG_FILE_NAME, CONFIG_ENV_VAR).resolve(cli_path);
        let mut config: DjConfig = load_toml_or_default(path.as_deref())?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Secrets from the environment win over the file
    pub fn apply_env_overrides(&mut self) {
        if let Some(key) = env_override("ANTHROPIC_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Some(id) = env_override("SPOTIFY_CLIENT_ID") {
            self.spotify.client_id = Some(id);
        }
        if let Some(secret) = env_override("SPOTIFY_CLIENT_SECRET") {
            self.spotify.client_secret = Some(secret);
        }
        if let Some(token) = env_override("SPOTIFY_REFRESH_TOKEN") {
            self.spotify.refresh_token = Some(token);
        }
    }

    /// Configured language-model key, if any non-blank one is present
    pub fn llm_api_key(&self) -> Option<&str> {
        self.llm.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// Default directive for the tracing filter
    pub fn log_directive(&self) -> String {
        format!("wkmp_dj={level},tower_http={level}", level = self.logging.level)
    }
}
