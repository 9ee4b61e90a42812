use crate::engine::MlockPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Invalid value '{value}' for {key}")]
    InvalidValue { key: String, value: String },
}

/// Whether calls into the same method may overlap.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExecutionPolicy {
    /// Dispatch every call as soon as a worker is free.
    #[default]
    Concurrent,
    /// Hold a per-method lock around engine calls.
    SerializePerMethod,
}

/// How host numbers are marshaled into the engine.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NumericInputMode {
    /// Every number becomes a double.
    #[default]
    Double,
    /// Integral numbers become ints where the method declares an int input.
    FollowMethodMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub worker_threads: usize,
    pub mlock: MlockPolicy,
    pub execution_policy: ExecutionPolicy,
    pub numeric_inputs: NumericInputMode,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            worker_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            mlock: MlockPolicy::default(),
            execution_policy: ExecutionPolicy::default(),
            numeric_inputs: NumericInputMode::default(),
        }
    }
}

pub const ENV_PREFIX: &str = "MODELBRIDGE_";

impl BridgeConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validated()
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Defaults overridden by `MODELBRIDGE_*` variables from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_overrides(std::env::vars())
    }

    /// Applies `MODELBRIDGE_WORKER_THREADS`, `MODELBRIDGE_MLOCK`,
    /// `MODELBRIDGE_EXECUTION_POLICY` and `MODELBRIDGE_NUMERIC_INPUTS`. Other variables
    /// are ignored.
    pub fn with_env_overrides<I, K, V>(mut self, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let (key, value) = (key.as_ref(), value.as_ref());
            let Some(name) = key.strip_prefix(ENV_PREFIX) else {
                continue;
            };
            match name {
                "WORKER_THREADS" => self.worker_threads = parse_value(key, value)?,
                "MLOCK" => self.mlock = parse_value(key, value)?,
                "EXECUTION_POLICY" => self.execution_policy = parse_value(key, value)?,
                "NUMERIC_INPUTS" => self.numeric_inputs = parse_value(key, value)?,
                _ => log::debug!("Ignoring unknown config variable {key}"),
            }
        }
        self.validated()
    }

    fn validated(self) -> Result<Self, ConfigError> {
        if self.worker_threads == 0 {
            return Err(ConfigError::InvalidValue {
                key: "worker_threads".to_string(),
                value: "0".to_string(),
            });
        }
        Ok(self)
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
