//! Benchmark configuration file format.
//!
//! Loads [`BenchConfig`] from a TOML file (`vecadd.toml`) with environment
//! variable overrides via `VECADD_*` prefixed variables.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which accelerator device the run should offload to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceRequest {
    /// CUDA when compiled and reachable, otherwise the unavailable stub.
    Auto,
    /// Require CUDA; reports device-unavailable when it cannot be used.
    Cuda,
    /// Host thread pool emulating a device with separate memory.
    Host,
    /// Always report device-unavailable.
    None,
}

impl std::fmt::Display for DeviceRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Cuda => write!(f, "cuda"),
            Self::Host => write!(f, "host"),
            Self::None => write!(f, "none"),
        }
    }
}

impl std::str::FromStr for DeviceRequest {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cuda" | "gpu" => Ok(Self::Cuda),
            "host" => Ok(Self::Host),
            "none" => Ok(Self::None),
            other => Err(format!("unknown device: {other}")),
        }
    }
}

/// Benchmark configuration loaded from TOML with environment variable overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BenchConfig {
    /// Elements in the f32 suite.
    /// Override: `VECADD_FLOAT_ELEMENTS`
    pub float_elements: usize,

    /// Elements in the i32 suite.
    /// Override: `VECADD_INT_ELEMENTS`
    pub int_elements: usize,

    /// Absolute tolerance for f32 verification.
    /// Override: `VECADD_EPSILON`
    pub epsilon: f64,

    /// Timed repetitions per backend; the fastest is reported.
    /// Override: `VECADD_ITERATIONS`
    pub iterations: u32,

    /// Accelerator device selection.
    /// Override: `VECADD_DEVICE`
    pub device: DeviceRequest,

    /// Zero-based accelerator device index.
    /// Override: `VECADD_DEVICE_INDEX`
    pub device_index: usize,

    /// Threads per block (CUDA) or elements per task chunk (host device).
    /// Override: `VECADD_WORK_GROUP_SIZE`
    pub work_group_size: u32,

    /// Run the candidate backends on separate threads.
    /// Override: `VECADD_CONCURRENT_BACKENDS`
    pub concurrent_backends: bool,
}

/// Default tolerance for floating-point verification
pub const DEFAULT_EPSILON: f64 = 1e-6;

/// Every variable read by [`BenchConfig::apply_env_overrides`]
pub const ENV_OVERRIDES: [&str; 8] = [
    "VECADD_FLOAT_ELEMENTS",
    "VECADD_INT_ELEMENTS",
    "VECADD_EPSILON",
    "VECADD_ITERATIONS",
    "VECADD_DEVICE",
    "VECADD_DEVICE_INDEX",
    "VECADD_WORK_GROUP_SIZE",
    "VECADD_CONCURRENT_BACKENDS",
];

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            float_elements: 25_000_000,
            int_elements: 25_000_000,
            epsilon: DEFAULT_EPSILON,
            iterations: 1,
            device: DeviceRequest::Auto,
            device_index: 0,
            work_group_size: 256,
            concurrent_backends: false,
        }
    }
}

/// Errors that can occur when loading or validating a [`BenchConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid environment override {key}={value}: {reason}")]
    EnvOverride { key: String, value: String, reason: String },
}

fn env_parse<T>(key: &str, target: &mut T) -> Result<(), ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Ok(val) = std::env::var(key) {
        *target = val.trim().parse::<T>().map_err(|e| ConfigError::EnvOverride {
            key: key.into(),
            value: val.clone(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

impl BenchConfig {
    /// Generate a default configuration TOML string.
    pub fn default_toml() -> String {
        toml::to_string_pretty(&Self::default()).unwrap_or_default()
    }

    /// Load configuration from a TOML file, falling back to defaults for
    /// missing fields, then apply environment variable overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Load from TOML string (useful for testing).
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let mut cfg: BenchConfig = toml::from_str(toml_str)?;
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load only from environment variables, starting from defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut cfg = Self::default();
        cfg.apply_env_overrides()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate the configuration, returning an error with a descriptive
    /// message on failure.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.epsilon.is_finite() || self.epsilon < 0.0 {
            return Err(ConfigError::Validation(format!(
                "epsilon must be finite and >= 0, got {}",
                self.epsilon
            )));
        }
        if self.iterations == 0 {
            return Err(ConfigError::Validation("iterations must be > 0".into()));
        }
        if self.work_group_size == 0 || !self.work_group_size.is_power_of_two() {
            return Err(ConfigError::Validation(format!(
                "work_group_size must be a power of two, got {}",
                self.work_group_size
            )));
        }
        if self.work_group_size > 1024 {
            return Err(ConfigError::Validation(format!(
                "work_group_size must be <= 1024, got {}",
                self.work_group_size
            )));
        }
        Ok(())
    }

    /// Apply `VECADD_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let present: Vec<&str> =
            ENV_OVERRIDES.iter().copied().filter(|k| std::env::var_os(k).is_some()).collect();
        if !present.is_empty() {
            log::debug!("Environment overrides set: {}", present.join(", "));
        }

        env_parse("VECADD_FLOAT_ELEMENTS", &mut self.float_elements)?;
        env_parse("VECADD_INT_ELEMENTS", &mut self.int_elements)?;
        env_parse("VECADD_EPSILON", &mut self.epsilon)?;
        env_parse("VECADD_ITERATIONS", &mut self.iterations)?;
        env_parse("VECADD_DEVICE", &mut self.device)?;
        env_parse("VECADD_DEVICE_INDEX", &mut self.device_index)?;
        env_parse("VECADD_WORK_GROUP_SIZE", &mut self.work_group_size)?;

        if let Ok(val) = std::env::var("VECADD_CONCURRENT_BACKENDS") {
            self.concurrent_backends = matches!(val.as_str(), "1" | "true" | "yes");
        }

        log::debug!("benchmark config after env overrides: {:?}", self);
        Ok(())
    }
}
