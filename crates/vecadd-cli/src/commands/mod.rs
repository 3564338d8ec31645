//! CLI subcommands

mod devices;
mod run;

pub use devices::{DeviceReport, DevicesCommand};
pub use run::{RunCommand, RunSummary};

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;
use vecadd_common::{BenchConfig, DeviceRequest};

/// Configuration flags shared by every subcommand
///
/// Precedence: flags, then `VECADD_*` environment, then the config file,
/// then defaults.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Configuration file path (TOML)
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Accelerator device (auto, cuda, host, none)
    #[arg(short, long, value_name = "DEVICE", global = true)]
    pub device: Option<DeviceRequest>,

    /// Accelerator device index
    #[arg(long, value_name = "N", global = true)]
    pub device_index: Option<usize>,

    /// Threads per block (CUDA) or elements per task (host device)
    #[arg(long, value_name = "N", global = true)]
    pub work_group_size: Option<u32>,
}

impl ConfigArgs {
    /// Build the effective configuration
    pub fn load(&self) -> Result<BenchConfig> {
        let mut config = match &self.config {
            Some(path) => BenchConfig::load(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
            None => BenchConfig::from_env().context("Invalid VECADD_* environment override")?,
        };

        if let Some(device) = self.device {
            config.device = device;
        }
        if let Some(index) = self.device_index {
            config.device_index = index;
        }
        if let Some(size) = self.work_group_size {
            config.work_group_size = size;
        }
        config.validate().context("Invalid configuration")?;

        tracing::debug!("Effective configuration: {:?}", config);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    use vecadd_common::ENV_OVERRIDES;

    /// Every override unset except those in `set`
    fn env_with<'a>(set: &[(&'a str, &'a str)]) -> Vec<(&'a str, Option<&'a str>)> {
        ENV_OVERRIDES
            .iter()
            .map(|&k| (k, set.iter().find(|(s, _)| *s == k).map(|&(_, v)| v)))
            .collect()
    }

    #[test]
    #[serial(vecadd_env)]
    fn flags_override_file_and_environment() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "device = \"none\"\niterations = 3\nwork_group_size = 64").unwrap();

        let args = ConfigArgs {
            config: Some(file.path().to_path_buf()),
            device: Some(DeviceRequest::Host),
            ..ConfigArgs::default()
        };

        temp_env::with_vars(env_with(&[("VECADD_DEVICE", "cuda"), ("VECADD_ITERATIONS", "5")]), || {
            let config = args.load().unwrap();
            assert_eq!(config.device, DeviceRequest::Host);
            assert_eq!(config.iterations, 5);
            assert_eq!(config.work_group_size, 64);
        });
    }

    #[test]
    #[serial(vecadd_env)]
    fn invalid_flag_value_is_rejected() {
        let args = ConfigArgs { work_group_size: Some(100), ..ConfigArgs::default() };
        temp_env::with_vars(env_with(&[]), || {
            let err = args.load().unwrap_err();
            assert!(format!("{err:#}").contains("power of two"));
        });
    }

    #[test]
    #[serial(vecadd_env)]
    fn missing_config_file_names_path() {
        let args = ConfigArgs {
            config: Some(PathBuf::from("/nonexistent/vecadd.toml")),
            ..ConfigArgs::default()
        };
        temp_env::with_vars(env_with(&[]), || {
            let err = args.load().unwrap_err();
            assert!(err.to_string().contains("/nonexistent/vecadd.toml"));
        });
    }
}
