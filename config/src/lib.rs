//! Configuration loading for batchloop.
//!
//! Raw TOML structs keep `Option` fields; [`EngineConfig::resolve`] turns them
//! into a validated [`LoopOptions`] at the parse boundary.

use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::{env, fs, thread};

use serde::Deserialize;
use thiserror::Error;

use batchloop_types::{LoopOptions, LoopTimeout, OptionsError, PartitionSize};

/// Overrides the config file location.
pub const CONFIG_PATH_ENV: &str = "BATCHLOOP_CONFIG";
pub const PARTITION_SIZE_ENV: &str = "BATCHLOOP_PARTITION_SIZE";
pub const TIMEOUT_MS_ENV: &str = "BATCHLOOP_TIMEOUT_MS";

#[derive(Debug, Default, Deserialize)]
pub struct BatchloopConfig {
    pub engine: Option<EngineConfig>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

/// `[engine]` section.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct EngineConfig {
    /// Absolute partition size. Wins over `partition_multiplier`.
    pub partition_size: Option<usize>,
    /// Multiple of host parallelism used when `partition_size` is absent. Default: 2.
    pub partition_multiplier: Option<usize>,
    /// Wall-clock budget for one operation. Default: 120000.
    pub timeout_ms: Option<u64>,
}

impl BatchloopConfig {
    /// Load from [`config_path`]. A missing file is not an error.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let path = match config_path() {
            Some(path) => path,
            None => return Ok(None),
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(config),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// The `[engine]` section with environment overrides applied.
    #[must_use]
    pub fn engine_with_env(&self) -> EngineConfig {
        self.engine.clone().unwrap_or_default().with_env_overrides()
    }
}

impl EngineConfig {
    /// Apply `BATCHLOOP_PARTITION_SIZE` / `BATCHLOOP_TIMEOUT_MS`.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup. Unparsable values are
    /// logged and ignored.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(size) = parse_override::<usize>(&lookup, PARTITION_SIZE_ENV) {
            self.partition_size = Some(size);
        }
        if let Some(millis) = parse_override::<u64>(&lookup, TIMEOUT_MS_ENV) {
            self.timeout_ms = Some(millis);
        }
        self
    }

    /// Resolve into validated options for a host with `parallelism` hardware threads.
    pub fn resolve(&self, parallelism: NonZeroUsize) -> Result<LoopOptions, OptionsError> {
        let partition_size = match self.partition_size {
            Some(size) => PartitionSize::new(size)?,
            None => PartitionSize::for_hardware(
                parallelism,
                self.partition_multiplier
                    .unwrap_or(PartitionSize::DEFAULT_MULTIPLIER),
            ),
        };
        let timeout = match self.timeout_ms {
            Some(millis) => LoopTimeout::from_millis(millis)?,
            None => LoopTimeout::DEFAULT,
        };
        Ok(LoopOptions::new(partition_size, timeout))
    }
}

fn parse_override<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring unparsable override");
            None
        }
    }
}

/// Hardware threads available to this process, falling back to 1.
#[must_use]
pub fn host_parallelism() -> NonZeroUsize {
    match thread::available_parallelism() {
        Ok(parallelism) => parallelism,
        Err(err) => {
            tracing::warn!("Could not determine available parallelism, assuming 1: {err}");
            NonZeroUsize::MIN
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::home_dir().map(|home| home.join(".batchloop").join("config.toml"))
}
