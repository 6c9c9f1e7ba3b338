//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration comes from a TOML file. Every key is optional and
//! falls back to a built-in default, and a missing file is not an error: the
//! service starts with defaults.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable naming the root folder
pub const ROOT_FOLDER_ENV: &str = "SCINET_ROOT_FOLDER";

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// Root folder holding the database and raw payloads
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Interface to bind the HTTP server to
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Database file name, relative to the root folder
    #[serde(default = "default_database_file")]
    pub database_file: String,

    /// Raw payload directory name, relative to the root folder
    #[serde(default = "default_raw_payload_dir")]
    pub raw_payload_dir: String,

    /// Largest accepted request body, in bytes
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
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

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            root_folder: None,
            host: default_host(),
            port: default_port(),
            database_file: default_database_file(),
            raw_payload_dir: default_raw_payload_dir(),
            max_body_bytes: default_max_body_bytes(),
            logging: LoggingConfig::default(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5780
}

fn default_database_file() -> String {
    "scinet.db".to_string()
}

fn default_raw_payload_dir() -> String {
    "raw_payloads".to_string()
}

/// Default request body limit (16 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    /// Load configuration from a file
    ///
    /// Returns `None` when the file does not exist, leaving the caller to
    /// fall back to defaults and report it. A file that exists but cannot be
    /// parsed is an error.
    pub fn load(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map(Some)
    }
}

/// Default config file location: `<config_dir>/scinet/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("scinet").join("config.toml"))
}

/// Root folder resolution, highest priority first:
/// 1. Command-line argument
/// 2. Environment variable
/// 3. TOML config file
/// 4. OS-dependent compiled default
pub fn resolve_root_folder(cli_arg: Option<&Path>, config: &TomlConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(ROOT_FOLDER_ENV) {
        if !path.is_empty() {
            return PathBuf::from(path);
        }
    }

    if let Some(path) = &config.root_folder {
        return path.clone();
    }

    default_root_folder()
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("scinet"))
        .unwrap_or_else(|| PathBuf::from("./scinet_data"))
}

/// Filesystem layout under a resolved root folder
#[derive(Debug, Clone)]
pub struct RootFolder {
    root: PathBuf,
    database_file: String,
    raw_payload_dir: String,
}

impl RootFolder {
    pub fn new(root: PathBuf, config: &TomlConfig) -> Self {
        Self {
            root,
            database_file: config.database_file.clone(),
            raw_payload_dir: config.raw_payload_dir.clone(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn database_path(&self) -> PathBuf {
        self.root.join(&self.database_file)
    }

    pub fn raw_payload_path(&self) -> PathBuf {
        self.root.join(&self.raw_payload_dir)
    }

    /// Create the root folder and raw payload directory if missing (idempotent)
    pub fn ensure_directories_exist(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        std::fs::create_dir_all(self.raw_payload_path())?;
        Ok(())
    }
}
