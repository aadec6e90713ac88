//! Board configuration: TOML file plus environment overrides.
//!
//! # Invariants
//! - Missing file fields take defaults; a missing file is not an error.
//! - Environment variables win over file values.
//! - `failure_rate` lies in `[0, 1]` and `latency_min_ms <= latency_max_ms`.

use crate::query::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::remote::latency::{DEFAULT_LATENCY_MAX_MS, DEFAULT_LATENCY_MIN_MS};
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_FAILURE_RATE: f64 = 0.08;
const DEFAULT_DB_FILE_NAME: &str = "hireboard.sqlite3";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, message: String },
    Parse(toml::de::Error),
    InvalidEnv { key: &'static str, value: String },
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "cannot read config `{}`: {message}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config file: {err}"),
            Self::InvalidEnv { key, value } => write!(f, "invalid value `{value}` for {key}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            _ => None,
        }
    }
}

/// Simulated remote tuning.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub latency_min_ms: u64,
    pub latency_max_ms: u64,
    /// Probability that a mutating call fails.
    pub failure_rate: f64,
    /// Seeds the fault RNG for reproducible sessions.
    pub seed: Option<u64>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            latency_min_ms: DEFAULT_LATENCY_MIN_MS,
            latency_max_ms: DEFAULT_LATENCY_MAX_MS,
            failure_rate: DEFAULT_FAILURE_RATE,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub db_path: PathBuf,
    pub log_level: Option<String>,
    /// Logging stays off unless a directory is configured.
    pub log_dir: Option<PathBuf>,
    pub page_size: u32,
    pub remote: RemoteConfig,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DEFAULT_DB_FILE_NAME),
            log_level: None,
            log_dir: None,
            page_size: DEFAULT_PAGE_SIZE,
            remote: RemoteConfig::default(),
        }
    }
}

impl BoardConfig {
    /// Reads `path` when given and present, then applies process env overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(ConfigError::Parse)
    }

    /// Applies `HIREBOARD_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("HIREBOARD_DB_PATH") {
            self.db_path = PathBuf::from(value);
        }
        if let Some(value) = lookup("HIREBOARD_LOG_LEVEL") {
            self.log_level = Some(value);
        }
        if let Some(value) = lookup("HIREBOARD_LOG_DIR") {
            self.log_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = lookup("HIREBOARD_FAILURE_RATE") {
            self.remote.failure_rate = parse_env("HIREBOARD_FAILURE_RATE", &value)?;
        }
        if let Some(value) = lookup("HIREBOARD_LATENCY_MS") {
            let (min, max) = parse_latency_range(&value).ok_or(ConfigError::InvalidEnv {
                key: "HIREBOARD_LATENCY_MS",
                value: value.clone(),
            })?;
            self.remote.latency_min_ms = min;
            self.remote.latency_max_ms = max;
        }
        if let Some(value) = lookup("HIREBOARD_SEED") {
            self.remote.seed = Some(parse_env("HIREBOARD_SEED", &value)?);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let rate = self.remote.failure_rate;
        if !(0.0..=1.0).contains(&rate) {
            return Err(ConfigError::Invalid(format!(
                "failure_rate must be within [0, 1], got {rate}"
            )));
        }
        if self.remote.latency_min_ms > self.remote.latency_max_ms {
            return Err(ConfigError::Invalid(format!(
                "latency_min_ms {} exceeds latency_max_ms {}",
                self.remote.latency_min_ms, self.remote.latency_max_ms
            )));
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::Invalid(format!(
                "page_size must be within [1, {MAX_PAGE_SIZE}], got {}",
                self.page_size
            )));
        }
        Ok(())
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    })
}

/// Accepts `min..max` or a single fixed value.
fn parse_latency_range(value: &str) -> Option<(u64, u64)> {
    match value.split_once("..") {
        Some((min, max)) => Some((min.trim().parse().ok()?, max.trim().parse().ok()?)),
        None => {
            let fixed = value.trim().parse().ok()?;
            Some((fixed, fixed))
        }
    }
}
