//! Application configuration.
//!
//! # Responsibility
//! - Load `portfolio.toml` with defaults for every missing key.
//! - Apply `PORTFOLIO_*` environment overrides on top of the file.
//!
//! # Invariants
//! - A missing default config file is not an error; an explicit path is.
//! - Relative directories are interpreted relative to the working directory.

use crate::repo::StoreBackend;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "portfolio.toml";

pub const ENV_DATA_DIR: &str = "PORTFOLIO_DATA_DIR";
pub const ENV_BACKEND: &str = "PORTFOLIO_BACKEND";
pub const ENV_BASE_URL: &str = "PORTFOLIO_BASE_URL";
pub const ENV_LOG_LEVEL: &str = "PORTFOLIO_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "PORTFOLIO_LOG_DIR";

#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidValue {
        key: &'static str,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "invalid config `{}`: {source}", path.display())
            }
            Self::InvalidValue { key, message } => write!(f, "invalid `{key}`: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::InvalidValue { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub links: LinksConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub reports: ReportsConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            data_dir: default_data_dir(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinksConfig {
    /// Submission form URL; links are disabled when unset.
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Defaults to `<data_dir>/logs`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportsConfig {
    #[serde(default = "default_reports_dir")]
    pub output_dir: PathBuf,
}

impl Default for ReportsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_reports_dir(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_log_level() -> String {
    crate::logging::default_log_level().to_string()
}

fn default_reports_dir() -> PathBuf {
    PathBuf::from("reports")
}

impl AppConfig {
    /// Loads `path`, or `portfolio.toml` when present, or the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `PORTFOLIO_*` overrides resolved through `lookup`.
    ///
    /// Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(value) = get(ENV_DATA_DIR) {
            self.store.data_dir = PathBuf::from(value);
        }
        if let Some(value) = get(ENV_BACKEND) {
            self.store.backend = value
                .parse()
                .map_err(|message| ConfigError::InvalidValue {
                    key: ENV_BACKEND,
                    message,
                })?;
        }
        if let Some(value) = get(ENV_BASE_URL) {
            self.links.base_url = Some(value.trim().to_string());
        }
        if let Some(value) = get(ENV_LOG_LEVEL) {
            self.logging.level = value.trim().to_string();
        }
        if let Some(value) = get(ENV_LOG_DIR) {
            self.logging.dir = Some(PathBuf::from(value));
        }
        Ok(())
    }

    pub fn log_dir(&self) -> PathBuf {
        self.logging
            .dir
            .clone()
            .unwrap_or_else(|| self.store.data_dir.join("logs"))
    }
}
