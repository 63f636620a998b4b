//! Configuration loading
//!
//! Each setting resolves in priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file is not fatal: it is logged and the
//! remaining tiers still apply.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const ENV_DATABASE_PATH: &str = "CATALOG_DATABASE";
pub const ENV_BIND_ADDR: &str = "CATALOG_BIND";
pub const ENV_API_TOKEN: &str = "CATALOG_API_TOKEN";
pub const ENV_LOG_LEVEL: &str = "CATALOG_LOG";

/// Default listen address of the catalog server
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5730";

/// Compiled defaults for the current platform
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub database_path: PathBuf,
    pub bind_addr: String,
    pub log_level: String,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            database_path: default_data_folder().join("catalog.db"),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// OS-dependent data folder (`~/.local/share/catalog` on Linux)
pub fn default_data_folder() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("catalog"))
        .unwrap_or_else(|| PathBuf::from("./catalog_data"))
}

/// Default configuration file path for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("catalog").join("config.toml"))
}

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct TomlConfig {
    pub database_path: Option<String>,
    pub bind_addr: Option<String>,
    pub api_token: Option<String>,
    pub log_level: Option<String>,
}

impl TomlConfig {
    /// Parse a config file, failing on I/O or syntax errors
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Read a config file if it exists, falling back to an empty config
    ///
    /// Reports what happened instead of logging it, so a caller can read
    /// the file before the subscriber is installed.
    pub fn read(path: Option<&Path>) -> (Self, ConfigFileStatus) {
        let Some(path) = path else {
            return (Self::default(), ConfigFileStatus::NotGiven);
        };

        if !path.exists() {
            return (Self::default(), ConfigFileStatus::Missing(path.to_path_buf()));
        }

        match Self::load(path) {
            Ok(config) => (config, ConfigFileStatus::Loaded(path.to_path_buf())),
            Err(e) => (Self::default(), ConfigFileStatus::Ignored(e.to_string())),
        }
    }

    /// [`TomlConfig::read`], logging the outcome right away
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let (config, status) = Self::read(path);
        status.log();
        config
    }
}

/// Outcome of looking for `config.toml`
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigFileStatus {
    /// No path was given and the platform has no config dir
    NotGiven,
    Missing(PathBuf),
    Loaded(PathBuf),
    /// Unreadable or malformed; holds the error text
    Ignored(String),
}

impl ConfigFileStatus {
    pub fn log(&self) {
        match self {
            Self::NotGiven => {}
            Self::Missing(path) => info!("No config file at {}, using defaults", path.display()),
            Self::Loaded(path) => info!("Loaded config file: {}", path.display()),
            Self::Ignored(e) => warn!("Ignoring config file: {}", e),
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub database_path: Option<String>,
    pub bind_addr: Option<String>,
    pub api_token: Option<String>,
    pub log_level: Option<String>,
}

/// Fully resolved configuration
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    pub database_path: PathBuf,
    pub bind_addr: String,
    /// `None` disables the bearer guard
    pub api_token: Option<String>,
    pub log_level: String,
}

fn pick(cli: Option<String>, env_name: &str, file: Option<String>) -> Option<String> {
    cli.or_else(|| std::env::var(env_name).ok())
        .or(file)
        .filter(|v| !v.trim().is_empty())
}

impl CatalogConfig {
    /// Resolve every setting through CLI → ENV → TOML → defaults
    pub fn resolve(cli: CliOverrides, file: TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        Self {
            database_path: pick(cli.database_path, ENV_DATABASE_PATH, file.database_path)
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            bind_addr: pick(cli.bind_addr, ENV_BIND_ADDR, file.bind_addr)
                .unwrap_or(defaults.bind_addr),
            api_token: pick(cli.api_token, ENV_API_TOKEN, file.api_token),
            log_level: pick(cli.log_level, ENV_LOG_LEVEL, file.log_level)
                .unwrap_or(defaults.log_level),
        }
    }
}

/// Directives for the log filter
///
/// An explicit `--log-level` wins. Otherwise a non-blank `RUST_LOG` is
/// used, then the level resolved from ENV, TOML or defaults.
pub fn log_directives(cli_level: Option<&str>, rust_log: Option<&str>, resolved: &str) -> String {
    cli_level
        .or(rust_log)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(resolved)
        .to_string()
}
