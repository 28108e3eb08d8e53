use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use daoscript_common::{Address, AppRecord};

/// Errors that can occur in configuration operations
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidEnvVar(String, String),

    #[error("Failed to read file: {0}")]
    FileReadError(String),

    #[error("Failed to parse YAML: {0}")]
    YamlParseError(#[from] serde_yaml::Error),
}

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Variable naming the configuration file
pub const CONFIG_ENV: &str = "DAOSCRIPT_CONFIG";
pub const SIGNER_ENV: &str = "DAOSCRIPT_SIGNER";
pub const CHAIN_ID_ENV: &str = "DAOSCRIPT_CHAIN_ID";
pub const LOG_LEVEL_ENV: &str = "DAOSCRIPT_LOG_LEVEL";

/// Installed apps of a DAO, as the app resolver would report them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaoConfig {
    pub kernel: Address,
    #[serde(default)]
    pub apps: Vec<AppRecord>,
}

/// Interpreter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Address actions are produced for
    #[serde(default)]
    pub signer: Address,
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// ENS names known without a network lookup
    #[serde(default)]
    pub names: BTreeMap<String, Address>,
    #[serde(default)]
    pub daos: Vec<DaoConfig>,
}

fn default_chain_id() -> u64 {
    1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            signer: Address::ZERO,
            chain_id: default_chain_id(),
            log_level: default_log_level(),
            names: BTreeMap::new(),
            daos: Vec::new(),
        }
    }
}

impl Config {
    /// Load configuration from the environment: the file named by
    /// `DAOSCRIPT_CONFIG` when set, then individual variable overrides
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] with an arbitrary variable lookup
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup(CONFIG_ENV) {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        if let Some(signer) = lookup(SIGNER_ENV) {
            config.signer = signer
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar(SIGNER_ENV.to_string(), format!("{}", e)))?;
        }
        if let Some(chain_id) = lookup(CHAIN_ID_ENV) {
            config.chain_id = chain_id
                .parse()
                .map_err(|e| ConfigError::InvalidEnvVar(CHAIN_ID_ENV.to_string(), format!("{}", e)))?;
        }
        if let Some(level) = lookup(LOG_LEVEL_ENV) {
            config.log_level = level;
        }
        Ok(config)
    }

    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            ConfigError::FileReadError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), "Loaded configuration file");
        Self::from_yaml_str(&contents)
    }

    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(contents)?)
    }
}
