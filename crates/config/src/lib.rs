//! Configuration loading, validation, and management for Chimera.
//!
//! Loads configuration from `~/.chimera/config.toml` (or an explicit path)
//! with environment variable overrides. Validates all settings at startup.

use chimera_merge::{DEFAULT_MODEL_PROVIDER, DEFAULT_VOICE_MODEL, MergeDefaults, MergeRequest};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Output name used when none is given.
pub const DEFAULT_OUTPUT_NAME: &str = "merged-character";

/// The root configuration structure.
///
/// Maps directly to `~/.chimera/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where profiles are read from and written to
    #[serde(default)]
    pub store: StoreConfig,

    /// Merge defaults
    #[serde(default)]
    pub merge: MergeConfig,

    /// Merge jobs run by `chimera batch`
    #[serde(default)]
    pub jobs: Vec<JobConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding source profiles (`<id>.json`)
    #[serde(default = "default_profiles_dir")]
    pub profiles_dir: PathBuf,

    /// Directory merged profiles are written to
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_profiles_dir() -> PathBuf {
    PathBuf::from("characters")
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("merged-character")
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            profiles_dir: default_profiles_dir(),
            output_dir: default_output_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeConfig {
    /// Output name for `chimera merge` without `--output`
    #[serde(default = "default_output")]
    pub default_output: String,

    /// Model provider used when no source defines one
    #[serde(default = "default_model_provider")]
    pub default_model_provider: String,

    /// Voice configuration used when no source defines one
    #[serde(default = "default_voice")]
    pub default_voice: serde_json::Value,
}

fn default_output() -> String {
    DEFAULT_OUTPUT_NAME.into()
}
fn default_model_provider() -> String {
    DEFAULT_MODEL_PROVIDER.into()
}
fn default_voice() -> serde_json::Value {
    serde_json::json!({ "model": DEFAULT_VOICE_MODEL })
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            default_output: default_output(),
            default_model_provider: default_model_provider(),
            default_voice: default_voice(),
        }
    }
}

impl MergeConfig {
    /// The scalar fallbacks handed to the merger.
    pub fn merge_defaults(&self) -> MergeDefaults {
        MergeDefaults {
            model_provider: self.default_model_provider.clone(),
            voice: self.default_voice.clone(),
        }
    }
}

/// One merge job for `chimera batch`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobConfig {
    /// Output profile name
    pub output: String,

    /// Source profile identifiers in priority order. Empty = every profile.
    #[serde(default)]
    pub sources: Vec<String>,
}

impl JobConfig {
    pub fn to_request(&self) -> MergeRequest {
        MergeRequest::new(self.output.clone(), self.sources.clone())
    }
}

impl AppConfig {
    /// Load configuration from `path`, or from `~/.chimera/config.toml`
    /// when no path is given.
    ///
    /// Also checks environment variables for directory overrides:
    /// - `CHIMERA_PROFILES_DIR`
    /// - `CHIMERA_OUTPUT_DIR`
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_dir().join("config.toml"),
        };
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
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
        Ok(config)
    }

    /// Apply overrides from an environment lookup (highest priority).
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("CHIMERA_PROFILES_DIR").filter(|d| !d.is_empty()) {
            self.store.profiles_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("CHIMERA_OUTPUT_DIR").filter(|d| !d.is_empty()) {
            self.store.output_dir = PathBuf::from(dir);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".chimera")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.profiles_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "store.profiles_dir must not be empty".into(),
            ));
        }

        if self.store.output_dir.as_os_str().is_empty() {
            return Err(ConfigError::ValidationError(
                "store.output_dir must not be empty".into(),
            ));
        }

        if self.merge.default_output.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "merge.default_output must not be empty".into(),
            ));
        }

        if self.merge.default_model_provider.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "merge.default_model_provider must not be empty".into(),
            ));
        }

        if let Some(i) = self.jobs.iter().position(|j| j.output.trim().is_empty()) {
            return Err(ConfigError::ValidationError(format!(
                "jobs[{i}].output must not be empty"
            )));
        }

        Ok(())
    }

    /// Merge requests for every configured job, in file order.
    pub fn job_requests(&self) -> Vec<MergeRequest> {
        self.jobs.iter().map(JobConfig::to_request).collect()
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
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
