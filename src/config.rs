//! Configuration management for redock
//!
//! Settings are layered: built-in defaults, then an optional `redock.toml` in
//! the project root, then environment variables. Command-line flags are
//! applied last by the CLI.
//!
//! # Environment Variables
//!
//! - `SKIP_DOCKER_REBUILD`: set to `1` to skip the whole workflow
//! - `REDOCK_COMPOSE_FILE`: compose file name - default: "docker-compose.yml"
//! - `REDOCK_COMPOSE_COMMAND`: compose executable, whitespace separated - default: "docker-compose"
//! - `REDOCK_LOG_FILE`: log file relative to the project root, empty to disable - default: "redock.log"
//! - `REDOCK_HEALTH_TIMEOUT`: seconds to wait for services - default: "60"
//! - `REDOCK_HEALTH_INTERVAL`: seconds between health probes - default: "5"
//!
//! # Configuration File
//!
//! ```toml
//! compose_file = "docker-compose.yml"
//! compose_command = ["docker", "compose"]
//! log_file = "redock.log"
//!
//! [patterns]
//! rebuild = ["backend/**", "Dockerfile"]
//! skip = ["frontend/**", "*.md"]
//!
//! [health]
//! service = "db"
//! command = ["pg_isready", "-U", "postgres"]
//! timeout_secs = 60
//! interval_secs = 5
//! ```

use crate::classifier::{ChangeClassifier, DEFAULT_REBUILD_PATTERNS, DEFAULT_SKIP_PATTERNS};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Name of the optional configuration file in the project root
pub const CONFIG_FILE_NAME: &str = "redock.toml";

/// Environment variable that suppresses the workflow when set to `1`
pub const SKIP_ENV_VAR: &str = "SKIP_DOCKER_REBUILD";

pub const DEFAULT_COMPOSE_FILE: &str = "docker-compose.yml";
const DEFAULT_COMPOSE_COMMAND: &str = "docker-compose";
const DEFAULT_LOG_FILE: &str = "redock.log";
const DEFAULT_HEALTH_SERVICE: &str = "db";
const DEFAULT_HEALTH_COMMAND: &[&str] = &["pg_isready", "-U", "postgres"];
const DEFAULT_HEALTH_TIMEOUT_SECS: u64 = 60;
const DEFAULT_HEALTH_INTERVAL_SECS: u64 = 5;
const MAX_HEALTH_TIMEOUT_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration file {path}: {message}")]
    InvalidFile { path: PathBuf, message: String },

    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Readiness probe run inside a compose service after start-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthConfig {
    pub service: String,
    pub command: Vec<String>,
    pub timeout_secs: u64,
    pub interval_secs: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            service: DEFAULT_HEALTH_SERVICE.to_string(),
            command: to_strings(DEFAULT_HEALTH_COMMAND),
            timeout_secs: DEFAULT_HEALTH_TIMEOUT_SECS,
            interval_secs: DEFAULT_HEALTH_INTERVAL_SECS,
        }
    }
}

impl HealthConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedockConfig {
    /// Directory holding the compose file and the git checkout
    pub project_root: PathBuf,

    /// Compose file name, relative to the project root
    pub compose_file: String,

    /// Compose executable and leading arguments, e.g. `["docker", "compose"]`
    pub compose_command: Vec<String>,

    /// Log file relative to the project root; `None` disables file logging
    pub log_file: Option<PathBuf>,

    pub rebuild_patterns: Vec<String>,

    pub skip_patterns: Vec<String>,

    pub health: HealthConfig,

    /// Skip the workflow entirely (`SKIP_DOCKER_REBUILD=1`)
    pub skip_rebuild: bool,
}

impl RedockConfig {
    /// Built-in defaults only; neither the file nor the environment is read
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            compose_file: DEFAULT_COMPOSE_FILE.to_string(),
            compose_command: vec![DEFAULT_COMPOSE_COMMAND.to_string()],
            log_file: Some(PathBuf::from(DEFAULT_LOG_FILE)),
            rebuild_patterns: to_strings(DEFAULT_REBUILD_PATTERNS),
            skip_patterns: to_strings(DEFAULT_SKIP_PATTERNS),
            health: HealthConfig::default(),
            skip_rebuild: false,
        }
    }

    /// Loads defaults, `redock.toml` (if present) and the process environment
    pub fn load(project_root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let mut config = Self::new(project_root);

        let file_path = config.project_root.join(CONFIG_FILE_NAME);
        if file_path.is_file() {
            debug!(path = %file_path.display(), "Loading configuration file");
            let file = FileConfig::load(&file_path)?;
            config.apply_file(file);
        }

        config.apply_env(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Overlays values present in a configuration file
    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(compose_file) = file.compose_file {
            self.compose_file = compose_file;
        }
        if let Some(compose_command) = file.compose_command {
            self.compose_command = compose_command;
        }
        if let Some(log_file) = file.log_file {
            self.log_file = log_file_setting(&log_file);
        }
        if let Some(patterns) = file.patterns {
            if let Some(rebuild) = patterns.rebuild {
                self.rebuild_patterns = rebuild;
            }
            if let Some(skip) = patterns.skip {
                self.skip_patterns = skip;
            }
        }
        if let Some(health) = file.health {
            if let Some(service) = health.service {
                self.health.service = service;
            }
            if let Some(command) = health.command {
                self.health.command = command;
            }
            if let Some(timeout_secs) = health.timeout_secs {
                self.health.timeout_secs = timeout_secs;
            }
            if let Some(interval_secs) = health.interval_secs {
                self.health.interval_secs = interval_secs;
            }
        }
    }

    /// Overlays environment variables, read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.skip_rebuild = lookup(SKIP_ENV_VAR).as_deref() == Some("1");

        if let Some(compose_file) = lookup("REDOCK_COMPOSE_FILE") {
            self.compose_file = compose_file;
        }
        if let Some(command) = lookup("REDOCK_COMPOSE_COMMAND") {
            self.compose_command = command.split_whitespace().map(String::from).collect();
        }
        if let Some(log_file) = lookup("REDOCK_LOG_FILE") {
            self.log_file = log_file_setting(&log_file);
        }
        if let Some(timeout) = lookup("REDOCK_HEALTH_TIMEOUT") {
            self.health.timeout_secs = parse_secs("REDOCK_HEALTH_TIMEOUT", &timeout)?;
        }
        if let Some(interval) = lookup("REDOCK_HEALTH_INTERVAL") {
            self.health.interval_secs = parse_secs("REDOCK_HEALTH_INTERVAL", &interval)?;
        }

        Ok(())
    }

    /// Validates the configuration
    ///
    /// An empty rebuild pattern list is allowed: the classifier then never
    /// asks for a rebuild.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.compose_command.is_empty() || self.compose_command[0].trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Compose command must not be empty".to_string(),
            ));
        }
        if self.compose_file.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Compose file must not be empty".to_string(),
            ));
        }
        if self.health.service.trim().is_empty() || self.health.command.is_empty() {
            return Err(ConfigError::ValidationFailed(
                "Health check needs a service and a command".to_string(),
            ));
        }
        if self.health.timeout_secs > MAX_HEALTH_TIMEOUT_SECS {
            return Err(ConfigError::ValidationFailed(format!(
                "Health check timeout cannot exceed {} seconds",
                MAX_HEALTH_TIMEOUT_SECS
            )));
        }
        if self.health.timeout_secs > 0 && self.health.interval_secs == 0 {
            return Err(ConfigError::ValidationFailed(
                "Health check interval must be at least 1 second".to_string(),
            ));
        }
        if self.health.interval_secs > self.health.timeout_secs {
            return Err(ConfigError::ValidationFailed(
                "Health check interval cannot exceed the timeout".to_string(),
            ));
        }

        Ok(())
    }

    /// Absolute location of the log file, if file logging is enabled
    pub fn log_path(&self) -> Option<PathBuf> {
        self.log_file.as_ref().map(|file| self.project_root.join(file))
    }

    pub fn compose_file_path(&self) -> PathBuf {
        self.project_root.join(&self.compose_file)
    }

    pub fn classifier(&self) -> ChangeClassifier {
        ChangeClassifier::new(self.rebuild_patterns.clone(), self.skip_patterns.clone())
    }
}

/// On-disk layout of `redock.toml`
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub compose_file: Option<String>,
    pub compose_command: Option<Vec<String>>,
    pub log_file: Option<String>,
    pub patterns: Option<PatternsSection>,
    pub health: Option<HealthSection>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PatternsSection {
    pub rebuild: Option<Vec<String>>,
    pub skip: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HealthSection {
    pub service: Option<String>,
    pub command: Option<Vec<String>>,
    pub timeout_secs: Option<u64>,
    pub interval_secs: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|message| ConfigError::InvalidFile {
            path: path.to_path_buf(),
            message,
        })
    }

    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }
}

fn log_file_setting(value: &str) -> Option<PathBuf> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(PathBuf::from(value))
    }
}

fn parse_secs(field: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| ConfigError::ParseError {
            field: field.to_string(),
            error: e.to_string(),
        })
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
