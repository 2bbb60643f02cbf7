// src/config.rs

//! srcpm configuration
//!
//! Settings come from a TOML file (every key optional) and are then
//! overridden by command-line flags:
//!
//! ```toml
//! db_path = "/var/lib/srcpm/main/main.db"
//! work_dir = "/tmp/srcpm"
//! source_dir = "/usr/src/srcpm"
//! log_file = "/var/log/srcpm.log"
//! verbose = false
//! remote = "github.com/owner/packages"
//! repo_name = "main"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/srcpm/srcpm.toml";
pub const CONFIG_ENV_VAR: &str = "SRCPM_CONFIG";
pub const DEFAULT_DB_PATH: &str = "/var/lib/srcpm/main/main.db";
pub const DEFAULT_STATE_DIR: &str = "/var/lib/srcpm";
pub const DEFAULT_WORK_DIR: &str = "/tmp/srcpm";
pub const DEFAULT_SOURCE_DIR: &str = "/usr/src/srcpm";
pub const DEFAULT_LOG_FILE: &str = "/var/log/srcpm.log";
pub const DEFAULT_REPO_NAME: &str = "main";

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Package catalog database
    pub db_path: PathBuf,
    /// Where remote repositories are downloaded
    pub state_dir: PathBuf,
    /// Parent of throw-away build directories
    pub work_dir: PathBuf,
    /// Parent of kept source trees
    pub source_dir: PathBuf,
    /// Append-only log file
    pub log_file: PathBuf,
    /// Log at info level and show build output
    pub verbose: bool,
    /// Default repository coordinate for `sync`
    pub remote: Option<String>,
    /// Default repository name for `sync`
    pub repo_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            source_dir: PathBuf::from(DEFAULT_SOURCE_DIR),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            verbose: false,
            remote: None,
            repo_name: DEFAULT_REPO_NAME.to_string(),
        }
    }
}

impl Config {
    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigError(e.to_string()))
    }

    /// Load a configuration file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::from_toml(&content).map_err(|e| match e {
            Error::ConfigError(msg) => {
                Error::ConfigError(format!("Failed to parse config file {}: {msg}", path.display()))
            }
            other => other,
        })
    }

    /// Locate and load the configuration
    ///
    /// An explicit path (flag, then `$SRCPM_CONFIG`) must exist. The
    /// default location is optional: when absent, defaults are used.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR).filter(|p| !p.is_empty()) {
            return Self::load(Path::new(&path));
        }

        let default = Path::new(DEFAULT_CONFIG_PATH);
        if default.is_file() {
            Self::load(default)
        } else {
            debug!("No config file at {}, using defaults", default.display());
            Ok(Self::default())
        }
    }

    pub fn with_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.db_path = path.into();
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = dir.into();
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}
