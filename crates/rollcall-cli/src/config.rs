use std::path::{Path, PathBuf};

use rollcall_core::DEFAULT_SIMILARITY_THRESHOLD;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("similarity threshold must be a finite value in [-1, 1], got {0}")]
    InvalidThreshold(f64),
    #[error("invalid value for {key}: {value:?}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Matching configuration, loaded from an optional TOML file and then
/// overridden by `ROLLCALL_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Cosine similarity a candidate must reach to count as a match.
    pub similarity_threshold: f64,
    /// When set, descriptors of any other length are rejected on load.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descriptor_dim: Option<usize>,
    /// Rescale enrollment descriptors to unit length as they are loaded.
    pub normalize_on_load: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            descriptor_dim: None,
            normalize_on_load: true,
        }
    }
}

impl Config {
    /// Load configuration from `path` (or `ROLLCALL_CONFIG`) and the process
    /// environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with(path, |key| std::env::var(key).ok())
    }

    /// Same as [`load`](Self::load) with an explicit environment lookup.
    pub fn load_with(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| env("ROLLCALL_CONFIG").map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Ok(config)
    }

    /// Replace the threshold, e.g. from a command-line flag.
    pub fn with_threshold(mut self, threshold: f64) -> Result<Self, ConfigError> {
        self.similarity_threshold = threshold;
        self.validate()?;
        Ok(self)
    }

    fn apply_env(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        if let Some(v) = env_parse(&env, "ROLLCALL_SIMILARITY_THRESHOLD")? {
            self.similarity_threshold = v;
        }
        if let Some(v) = env_parse(&env, "ROLLCALL_DESCRIPTOR_DIM")? {
            self.descriptor_dim = Some(v);
        }
        if let Some(v) = env("ROLLCALL_NORMALIZE_ON_LOAD") {
            self.normalize_on_load = !matches!(v.trim(), "0" | "false" | "no" | "off");
        }
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let t = self.similarity_threshold;
        if !t.is_finite() || !(-1.0..=1.0).contains(&t) {
            return Err(ConfigError::InvalidThreshold(t));
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(
    env: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, ConfigError> {
    match env(key) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv { key, value }),
    }
}
