//! Configuration for peerset.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $PEERSET_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/peerset/config.toml
//!   3. ~/.config/peerset/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerSetConfig {
    pub registry: RegistryConfig,
    pub sampling: SamplingConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum number of peers held. 0 = unlimited.
    pub limit: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    /// Peers drawn per gossip round when no count is given.
    pub fanout: usize,
}

impl RegistryConfig {
    /// The limit as the registry understands it: `None` when unbounded.
    pub fn effective_limit(&self) -> Option<usize> {
        (self.limit > 0).then_some(self.limit)
    }
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for SamplingConfig {
    fn default() -> Self {
        Self { fanout: 6 }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("peerset")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl PeerSetConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::file_path())
    }

    /// Load from an explicit path, falling back to defaults if it is missing.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(path)
                .map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
            Self::parse(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))?
        } else {
            PeerSetConfig::default()
        };
        config.apply_env_overrides();
        Ok(config)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::SerializeFailed)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("PEERSET_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config to `path` unless a file is already there.
    /// Returns true if a file was written.
    pub fn write_default_at(path: &std::path::Path) -> Result<bool, ConfigError> {
        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteFailed(path.to_path_buf(), e))?;
        }
        let text = PeerSetConfig::default().to_toml()?;
        std::fs::write(path, text).map_err(|e| ConfigError::WriteFailed(path.to_path_buf(), e))?;
        Ok(true)
    }

    /// Apply PEERSET_* env var overrides. Unparseable values are ignored.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("PEERSET_REGISTRY__LIMIT") {
            if let Ok(n) = v.parse() {
                self.registry.limit = n;
            }
        }
        if let Some(v) = lookup("PEERSET_SAMPLING__FANOUT") {
            if let Ok(n) = v.parse() {
                self.sampling.fanout = n;
            }
        }
    }
}
