use crate::timing::AdjustPolicy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub merge: MergeConfig,
    pub timing: TimingConfig,
    pub pipeline: ChannelConfig,
}

/// Utterance merging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MergeConfig {
    pub min_silence_ms: u64,
    pub max_alternates: usize,
    pub separator: String,
}

/// Originating-time reconciliation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingConfig {
    pub policy: AdjustPolicy,
}

/// Pipeline channel sizing configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChannelConfig {
    pub event_buffer: usize,
    pub output_buffer: usize,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            min_silence_ms: crate::defaults::MIN_SILENCE_MS,
            max_alternates: crate::defaults::MAX_ALTERNATES,
            separator: crate::defaults::WORD_SEPARATOR.to_string(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            policy: AdjustPolicy::default(),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            event_buffer: crate::defaults::CHANNEL_CAPACITY,
            output_buffer: crate::defaults::CHANNEL_CAPACITY,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Returns an error if the file contains invalid TOML.
    /// Missing fields will use default values.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from a file or return defaults if file doesn't exist
    ///
    /// Only returns defaults if the file is missing.
    /// Returns errors for invalid TOML.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                if e.downcast_ref::<std::io::Error>()
                    .map(|io_err| io_err.kind() == std::io::ErrorKind::NotFound)
                    .unwrap_or(false)
                {
                    Self::default()
                } else {
                    // Re-panic on invalid TOML or other errors
                    panic!("Failed to load config from {}: {}", path.display(), e);
                }
            }
        }
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - UTTERFLOW_SEPARATOR → merge.separator
    /// - UTTERFLOW_MIN_SILENCE → merge.min_silence_ms (humantime, e.g. "750ms")
    /// - UTTERFLOW_MAX_ALTERNATES → merge.max_alternates
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(separator) = std::env::var("UTTERFLOW_SEPARATOR")
            && !separator.is_empty()
        {
            self.merge.separator = separator;
        }

        if let Ok(raw) = std::env::var("UTTERFLOW_MIN_SILENCE")
            && !raw.is_empty()
            && let Ok(duration) = humantime::parse_duration(&raw)
        {
            self.merge.min_silence_ms = duration.as_millis() as u64;
        }

        if let Ok(raw) = std::env::var("UTTERFLOW_MAX_ALTERNATES")
            && !raw.is_empty()
            && let Ok(count) = raw.parse::<usize>()
        {
            self.merge.max_alternates = count;
        }

        self
    }

    /// Get the default configuration file path
    ///
    /// Returns ~/.config/utterflow/config.toml on Linux
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .expect("Could not determine config directory")
            .join("utterflow")
            .join("config.toml")
    }
}
