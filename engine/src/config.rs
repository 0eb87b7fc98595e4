//! Configuration loading for the engine.
//!
//! TOML file at `~/.immanence/config.toml` (overridable via the
//! `IMMANENCE_CONFIG` environment variable). Every section is optional; a
//! missing file yields defaults, but a file that exists and fails to parse
//! is reported, not ignored.

use std::path::PathBuf;
use std::{env, fs};

use serde::Deserialize;

/// Default ride-timer duration in seconds, and the slider range it is
/// clamped to.
const DEFAULT_TIMER_SECS: u32 = immanence_types::WaveStage::DEFAULT_TIMER_SECS;
const TIMER_RANGE_SECS: std::ops::RangeInclusive<u32> = 10..=600;

#[derive(Debug, Default, Deserialize)]
pub struct ImmanenceConfig {
    pub storage: Option<StorageConfig>,
    pub wave: Option<WaveConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StorageConfig {
    /// Data directory override for the chain store.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
pub struct WaveConfig {
    /// Default ride-timer duration seeded into new chains, in seconds.
    pub default_timer_secs: Option<u32>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
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

/// Resolve the config file path: `IMMANENCE_CONFIG` override, else
/// `~/.immanence/config.toml`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Ok(custom) = env::var("IMMANENCE_CONFIG") {
        if !custom.trim().is_empty() {
            return Some(PathBuf::from(custom));
        }
    }
    dirs::home_dir().map(|home| home.join(".immanence").join("config.toml"))
}

impl ImmanenceConfig {
    /// Load the config file, or defaults when none exists.
    pub fn load() -> Result<Self, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(Self::default());
        };
        if !path.exists() {
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Parse from TOML text. Used by `load` and directly by tests.
    pub fn from_toml(raw: &str, path: PathBuf) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse { path, source })
    }

    /// Data directory for the chain store: configured override, else the
    /// platform data dir, else `.immanence` under the working directory.
    #[must_use]
    pub fn data_dir(&self) -> PathBuf {
        if let Some(dir) = self.storage.as_ref().and_then(|s| s.dir.clone()) {
            return dir;
        }
        dirs::data_dir()
            .map(|base| base.join("immanence"))
            .unwrap_or_else(|| PathBuf::from(".immanence"))
    }

    /// Default ride-timer duration, clamped to the slider range.
    #[must_use]
    pub fn default_timer_secs(&self) -> u32 {
        self.wave
            .as_ref()
            .and_then(|w| w.default_timer_secs)
            .map(|secs| secs.clamp(*TIMER_RANGE_SECS.start(), *TIMER_RANGE_SECS.end()))
            .unwrap_or(DEFAULT_TIMER_SECS)
    }
}
