//! Configuration loading, validation, and management for PersonaChat.
//!
//! Loads configuration from `~/.personachat/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use personachat_core::directives::Directive;
use personachat_core::{DirectiveTable, SessionConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.personachat/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Initial persona, style and sampling settings
    #[serde(default)]
    pub session: SessionConfig,

    /// Which generation backend to use and how to reach it
    #[serde(default)]
    pub backend: BackendConfig,

    /// Persona directives that override or extend the built-in table
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub personas: Vec<Directive>,

    /// Style directives that override or extend the built-in table
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub styles: Vec<Directive>,
}

/// The generation backend variants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Canned persona replies with artificial latency
    #[default]
    Simulated,
    /// An OpenAI-compatible chat-completions endpoint
    Remote,
}

impl std::str::FromStr for BackendKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "simulated" | "mock" => Ok(Self::Simulated),
            "remote" => Ok(Self::Remote),
            other => Err(ConfigError::ValidationError(format!(
                "unknown backend kind '{other}' (expected 'simulated' or 'remote')"
            ))),
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simulated => write!(f, "simulated"),
            Self::Remote => write!(f, "remote"),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub kind: BackendKind,

    #[serde(default)]
    pub simulated: SimulatedConfig,

    #[serde(default)]
    pub remote: RemoteConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatedConfig {
    /// Lower bound of the artificial reply latency
    #[serde(default = "default_min_latency_ms")]
    pub min_latency_ms: u64,

    /// Upper bound of the artificial reply latency
    #[serde(default = "default_max_latency_ms")]
    pub max_latency_ms: u64,
}

fn default_min_latency_ms() -> u64 {
    1000
}
fn default_max_latency_ms() -> u64 {
    3000
}

impl Default for SimulatedConfig {
    fn default() -> Self {
        Self {
            min_latency_ms: default_min_latency_ms(),
            max_latency_ms: default_max_latency_ms(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RemoteConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_model")]
    pub model: String,

    /// Requests running longer than this fail as backend-unavailable
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            model: default_model(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.personachat/config.toml).
    ///
    /// Environment variables take precedence over the file:
    /// - `PERSONACHAT_BACKEND` (`simulated` or `remote`)
    /// - `PERSONACHAT_API_KEY`
    /// - `PERSONACHAT_API_URL`
    /// - `PERSONACHAT_MODEL`
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        tracing::debug!(path = %path.display(), backend = %config.backend.kind, "Loaded config file");
        Ok(config)
    }

    /// Apply environment-style overrides through a lookup function.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(kind) = lookup("PERSONACHAT_BACKEND") {
            self.backend.kind = kind.parse()?;
        }
        if let Some(key) = lookup("PERSONACHAT_API_KEY") {
            self.backend.remote.api_key = Some(key);
        }
        if let Some(url) = lookup("PERSONACHAT_API_URL") {
            self.backend.remote.api_url = url;
        }
        if let Some(model) = lookup("PERSONACHAT_MODEL") {
            self.backend.remote.model = model;
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".personachat")
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        self.session.validate().map_err(|e| match e {
            personachat_core::Error::Config { message } => {
                ConfigError::ValidationError(format!("[session] {message}"))
            }
            other => ConfigError::ValidationError(other.to_string()),
        })?;

        let simulated = &self.backend.simulated;
        if simulated.min_latency_ms > simulated.max_latency_ms {
            return Err(ConfigError::ValidationError(
                "backend.simulated.min_latency_ms must not exceed max_latency_ms".into(),
            ));
        }

        if self.backend.remote.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "backend.remote.timeout_secs must be > 0".into(),
            ));
        }

        if self
            .personas
            .iter()
            .chain(self.styles.iter())
            .any(|d| d.key.trim().is_empty())
        {
            return Err(ConfigError::ValidationError(
                "persona and style keys must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// The built-in persona table with this config's overrides applied.
    pub fn persona_table(&self) -> DirectiveTable {
        merged(DirectiveTable::builtin_personas(), &self.personas)
    }

    /// The built-in style table with this config's overrides applied.
    pub fn style_table(&self) -> DirectiveTable {
        merged(DirectiveTable::builtin_styles(), &self.styles)
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        Self::default().to_toml()
    }

    /// Render this configuration as TOML.
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }
}

fn merged(mut table: DirectiveTable, overrides: &[Directive]) -> DirectiveTable {
    for d in overrides {
        table.upsert(d.key.trim(), d.directive.clone());
    }
    table
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
