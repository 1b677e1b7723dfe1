//! Server configuration.
//!
//! # Responsibility
//! - Load server settings from an optional TOML file.
//! - Apply `TABLETOP_*` environment overrides on top of the file.
//! - Reject settings the server cannot run with before anything starts.
//!
//! # Invariants
//! - A missing default config file means built-in defaults; a missing file
//!   that was explicitly requested is an error.
//! - Every session maps to a 24-char document id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tabletop_core::{default_log_level, is_document_id, ValidationLimits};

pub const ENV_BIND_ADDR: &str = "TABLETOP_BIND_ADDR";
pub const ENV_DB_PATH: &str = "TABLETOP_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TABLETOP_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TABLETOP_LOG_DIR";

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
const DEFAULT_DB_FILE_NAME: &str = "tabletop.sqlite3";
const DEFAULT_API_PREFIX: &str = "/api/v0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub db_path: PathBuf,
    /// Prefix every JSON route is mounted under.
    pub api_prefix: String,
    pub log_level: String,
    /// Absolute directory for rolling log files; stderr when unset.
    pub log_dir: Option<String>,
    /// Bearer token -> actor id.
    pub sessions: BTreeMap<String, String>,
    pub limits: ValidationLimits,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            api_prefix: DEFAULT_API_PREFIX.to_string(),
            log_level: default_log_level().to_string(),
            log_dir: None,
            sessions: BTreeMap::new(),
            limits: ValidationLimits::default(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "cannot parse config `{}`: {source}", path.display())
            }
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid(_) => None,
        }
    }
}

impl ServerConfig {
    /// Parses a TOML document. Absent keys keep their defaults.
    pub fn from_toml_str(raw: &str, origin: &Path) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Overrides fields from `lookup(name)`, typically `std::env::var`.
    pub fn apply_env_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        if let Some(value) = non_empty(ENV_BIND_ADDR) {
            self.bind_addr = value;
        }
        if let Some(value) = non_empty(ENV_DB_PATH) {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = non_empty(ENV_LOG_LEVEL) {
            self.log_level = value;
        }
        if let Some(value) = non_empty(ENV_LOG_DIR) {
            self.log_dir = Some(value);
        }
    }

    /// Checks cross-field rules.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.socket_addr()?;

        if !self.api_prefix.starts_with('/') || self.api_prefix.ends_with('/') {
            return Err(ConfigError::Invalid(format!(
                "api_prefix must start with `/` and not end with one, got `{}`",
                self.api_prefix
            )));
        }
        if self.limits.title_min > self.limits.title_max
            || self.limits.description_min > self.limits.description_max
            || self.limits.container_label_min > self.limits.container_label_max
        {
            return Err(ConfigError::Invalid(
                "limits: a minimum length exceeds its maximum".to_string(),
            ));
        }
        for (token, actor) in &self.sessions {
            if token.trim().is_empty() {
                return Err(ConfigError::Invalid("sessions: empty token".to_string()));
            }
            if !is_document_id(actor) {
                return Err(ConfigError::Invalid(format!(
                    "sessions: actor id `{actor}` is not a 24-character hex id"
                )));
            }
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_addr.parse().map_err(|err| {
            ConfigError::Invalid(format!("bind_addr `{}`: {err}", self.bind_addr))
        })
    }
}

/// Loads config from `path` (or defaults), applies environment overrides
/// and validates the result.
pub fn load_config(path: Option<&Path>) -> Result<ServerConfig, ConfigError> {
    load_config_with(path, |name| std::env::var(name).ok())
}

/// Same as [`load_config`] with an explicit variable lookup.
pub fn load_config_with(
    path: Option<&Path>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<ServerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            ServerConfig::from_toml_str(&raw, path)?
        }
        None => ServerConfig::default(),
    };
    config.apply_env_overrides(lookup);
    config.validate()?;
    Ok(config)
}
