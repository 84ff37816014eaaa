use super::ConfigError;
use crate::config::paths::WORKDIRS_DIR;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_ARCHITECT_MODEL: &str = "gpt-4o";
pub const DEFAULT_GENERATOR_MODEL: &str = "o1";
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_REQUEST_TIMEOUT_SECONDS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub workdirs_path: Option<PathBuf>,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_architect_model")]
    pub architect_model: String,
    #[serde(default = "default_generator_model")]
    pub generator_model: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
    #[serde(default)]
    pub script_timeout_seconds: u64,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_architect_model() -> String {
    DEFAULT_ARCHITECT_MODEL.to_string()
}

fn default_generator_model() -> String {
    DEFAULT_GENERATOR_MODEL.to_string()
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_request_timeout_seconds() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECONDS
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workdirs_path: None,
            api_base: default_api_base(),
            architect_model: default_architect_model(),
            generator_model: default_generator_model(),
            max_attempts: default_max_attempts(),
            request_timeout_seconds: default_request_timeout_seconds(),
            script_timeout_seconds: 0,
        }
    }
}

impl Settings {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        serde_yaml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_attempts == 0 {
            return Err(ConfigError::Settings(
                "max_attempts must be at least 1".to_string(),
            ));
        }
        if self.api_base.trim().is_empty() {
            return Err(ConfigError::Settings("api_base must be non-empty".to_string()));
        }
        if self.architect_model.trim().is_empty() {
            return Err(ConfigError::Settings(
                "architect_model must be non-empty".to_string(),
            ));
        }
        if self.generator_model.trim().is_empty() {
            return Err(ConfigError::Settings(
                "generator_model must be non-empty".to_string(),
            ));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Settings(
                "request_timeout_seconds must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn resolve_workdirs_path(&self, state_root: &Path) -> PathBuf {
        match &self.workdirs_path {
            Some(path) => path.clone(),
            None => state_root.join(WORKDIRS_DIR),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    pub fn script_timeout(&self) -> Option<Duration> {
        if self.script_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.script_timeout_seconds))
        }
    }
}
